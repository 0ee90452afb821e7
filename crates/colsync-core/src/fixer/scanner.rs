//! Structural extraction of `ADD COLUMN` clauses from migration SQL.
//!
//! Statements are split on `;` tokens and clauses on commas at parenthesis
//! depth zero. String literals and quoted identifiers are single tokens, so a
//! comma inside `ENUM('x,y')` or `` `a,b` `` can never split a clause.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::reorder::quote_identifier;

/// A `FIRST` / `AFTER <column>` suffix on a column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Positioning {
    /// `FIRST`
    First,
    /// ``AFTER `column` ``
    After(String),
}

impl Positioning {
    /// Case-insensitive comparison, as MySQL compares column names.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::First, Self::First) => true,
            (Self::After(a), Self::After(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl fmt::Display for Positioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("FIRST"),
            Self::After(column) => write!(f, "AFTER {}", quote_identifier(column)),
        }
    }
}

/// One `ADD COLUMN` clause found in a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnClause {
    /// Table named by the enclosing `ALTER TABLE`.
    pub table: String,
    /// Column being added.
    pub column: String,
    /// Source text after the column name, up to the end of the clause.
    pub definition: String,
    /// Source text of the enclosing statement, without the `;`.
    pub statement: String,
    /// Span of the enclosing statement.
    pub statement_span: Span,
    /// Span of the whole clause, from `ADD` to its last token.
    pub span: Span,
    /// Span of [`Self::definition`].
    pub definition_span: Span,
    /// Positioning suffix already present on the definition.
    pub positioning: Option<Positioning>,
    /// Span of the existing positioning suffix.
    pub positioning_span: Option<Span>,
}

impl AddColumnClause {
    /// Definition text without any existing positioning suffix.
    #[must_use]
    pub fn base_definition<'s>(&self, source: &'s str) -> &'s str {
        let end = self
            .positioning_span
            .map_or(self.definition_span.end, |span| span.start);
        source[self.definition_span.start..end].trim_end()
    }
}

/// Splits a token stream into statements on `;`, dropping empty ones.
fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut statements = Vec::new();
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if matches!(token.kind, TokenKind::Semicolon | TokenKind::Eof) {
            if i > start {
                statements.push(&tokens[start..i]);
            }
            start = i + 1;
        }
    }
    statements
}

/// Splits clause tokens on commas outside parentheses.
fn split_clauses(tokens: &[Token]) -> Vec<&[Token]> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => depth += 1,
            TokenKind::RightParen => depth = depth.saturating_sub(1),
            TokenKind::Comma if depth == 0 => {
                clauses.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&tokens[start..]);
    clauses
}

/// Matches `ALTER [ONLINE] [IGNORE] TABLE name` and returns the table name
/// with the tokens that follow it.
fn parse_alter_table<'t>(source: &str, tokens: &'t [Token]) -> Option<(String, &'t [Token])> {
    let (first, mut rest) = tokens.split_first()?;
    if !first.is_keyword(Keyword::Alter) {
        return None;
    }
    while let Some((token, tail)) = rest.split_first() {
        if token.is_keyword(Keyword::Online) || token.is_keyword(Keyword::Ignore) {
            rest = tail;
        } else {
            break;
        }
    }
    let (table_kw, tail) = rest.split_first()?;
    if !table_kw.is_keyword(Keyword::Table) {
        return None;
    }
    rest = tail;

    // `schema`.`table`: keep the last part.
    let (name_token, tail) = rest.split_first()?;
    let mut table = name_token.identifier_name(source)?;
    rest = tail;
    while let [dot, part, tail @ ..] = rest {
        if dot.kind != TokenKind::Dot {
            break;
        }
        table = part.identifier_name(source)?;
        rest = tail;
    }

    Some((table.to_string(), rest))
}

/// Detects a trailing `FIRST` / `AFTER col` in definition tokens.
fn trailing_positioning(source: &str, tokens: &[Token]) -> Option<(Positioning, Span)> {
    match tokens {
        // `AFTER first` names a column called `first`.
        [.., after, column] if after.is_keyword(Keyword::After) => {
            let name = column.identifier_name(source)?;
            Some((Positioning::After(name.to_string()), after.span.to(column.span)))
        }
        [.., last] if last.is_keyword(Keyword::First) => Some((Positioning::First, last.span)),
        _ => None,
    }
}

/// True if `FIRST` or `AFTER` appears anywhere but as a well-formed
/// trailing positioning clause, e.g. a bare `AFTER` or `AFTER 'x'`.
fn has_stray_positioning(source: &str, tokens: &[Token]) -> bool {
    let len = tokens.len();
    tokens.iter().enumerate().any(|(i, token)| {
        // The column name in `AFTER first` / `AFTER after`.
        let names_column = i + 1 == len && i > 0 && tokens[i - 1].is_keyword(Keyword::After);
        if names_column {
            false
        } else if token.is_keyword(Keyword::After) {
            i + 2 != len || tokens[i + 1].identifier_name(source).is_none()
        } else {
            token.is_keyword(Keyword::First) && i + 1 != len
        }
    })
}

/// Matches `ADD COLUMN [IF NOT EXISTS] name definition...`.
fn parse_add_column(
    source: &str,
    table: &str,
    statement_span: Span,
    tokens: &[Token],
) -> Option<AddColumnClause> {
    let [add, column_kw, rest @ ..] = tokens else {
        return None;
    };
    if !add.is_keyword(Keyword::Add) || !column_kw.is_keyword(Keyword::Column) {
        return None;
    }
    let rest = match rest {
        [if_kw, not, exists, tail @ ..]
            if if_kw.is_keyword(Keyword::If)
                && not.is_keyword(Keyword::Not)
                && exists.is_keyword(Keyword::Exists) =>
        {
            tail
        }
        _ => rest,
    };

    let (name_token, definition_tokens) = rest.split_first()?;
    let column = name_token.identifier_name(source)?;
    let (first, last) = (definition_tokens.first()?, definition_tokens.last()?);
    let definition_span = first.span.to(last.span);
    if has_stray_positioning(source, definition_tokens) {
        return None;
    }

    let (positioning, positioning_span) = match trailing_positioning(source, definition_tokens) {
        Some((positioning, span)) => {
            // A bare positioning clause with no type is not a column definition.
            if span.start == definition_span.start {
                return None;
            }
            (Some(positioning), Some(span))
        }
        None => (None, None),
    };

    Some(AddColumnClause {
        table: table.to_string(),
        column: column.to_string(),
        definition: definition_span.slice(source).to_string(),
        statement: statement_span.slice(source).to_string(),
        statement_span,
        span: add.span.to(last.span),
        definition_span,
        positioning,
        positioning_span,
    })
}

/// Extracts every well-formed `ADD COLUMN` clause from `sql`, in source order.
///
/// Anything that does not match the expected grammar is ignored.
#[must_use]
pub fn extract_add_column_clauses(sql: &str) -> Vec<AddColumnClause> {
    let tokens = Lexer::new(sql).tokenize();
    let mut clauses = Vec::new();

    for statement in split_statements(&tokens) {
        let (Some(first), Some(last)) = (statement.first(), statement.last()) else {
            continue;
        };
        let Some((table, rest)) = parse_alter_table(sql, statement) else {
            continue;
        };
        let statement_span = first.span.to(last.span);
        clauses.extend(
            split_clauses(rest)
                .into_iter()
                .filter_map(|clause| parse_add_column(sql, &table, statement_span, clause)),
        );
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clause() {
        let sql = "ALTER TABLE `User` ADD COLUMN `bio` TEXT NULL;";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 1);
        let clause = &clauses[0];
        assert_eq!(clause.table, "User");
        assert_eq!(clause.column, "bio");
        assert_eq!(clause.definition, "TEXT NULL");
        assert_eq!(clause.statement, "ALTER TABLE `User` ADD COLUMN `bio` TEXT NULL");
        assert_eq!(clause.positioning, None);
    }

    #[test]
    fn test_comma_inside_enum_literal_does_not_split() {
        let sql = "ALTER TABLE t ADD COLUMN a INT, ADD COLUMN b ENUM('x,y');";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].definition, "INT");
        assert_eq!(clauses[1].definition, "ENUM('x,y')");
    }

    #[test]
    fn test_comma_inside_parens_does_not_split() {
        let sql = "ALTER TABLE t ADD COLUMN price DECIMAL(10,2) NOT NULL DEFAULT 0.00, ADD COLUMN c INT;";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].definition, "DECIMAL(10,2) NOT NULL DEFAULT 0.00");
    }

    #[test]
    fn test_mixed_clauses_and_multiline() {
        let sql = "ALTER TABLE `posts`\n    DROP COLUMN `old`,\n    ADD COLUMN `slug` VARCHAR(191) NOT NULL,\n    ADD INDEX `idx` (`a`, `b`),\n    MODIFY `title` TEXT;\n";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].table, "posts");
        assert_eq!(clauses[0].column, "slug");
        assert_eq!(clauses[0].definition.as_str(), "VARCHAR(191) NOT NULL");
    }

    #[test]
    fn test_existing_positioning() {
        let sql = "ALTER TABLE t ADD COLUMN a INT FIRST, ADD COLUMN b INT after `A`;";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses[0].positioning, Some(Positioning::First));
        assert_eq!(clauses[0].base_definition(sql), "INT");
        assert_eq!(
            clauses[1].positioning,
            Some(Positioning::After("A".to_string()))
        );
        assert_eq!(clauses[1].base_definition(sql), "INT");
    }

    #[test]
    fn test_after_column_named_first() {
        let sql = "ALTER TABLE t ADD COLUMN b INT AFTER first;";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(
            clauses[0].positioning,
            Some(Positioning::After("first".to_string()))
        );
        assert_eq!(clauses[0].base_definition(sql), "INT");
    }

    #[test]
    fn test_string_default_that_looks_like_positioning() {
        let sql = "ALTER TABLE t ADD COLUMN a VARCHAR(10) DEFAULT 'FIRST';";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses[0].positioning, None);
    }

    #[test]
    fn test_qualified_table_and_options() {
        let sql = "alter online ignore table `shop`.`orders` add column if not exists `note` text;";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].table, "orders");
        assert_eq!(clauses[0].column, "note");
    }

    #[test]
    fn test_semicolons_in_strings_and_comments() {
        let sql = "-- ALTER TABLE x ADD COLUMN y INT;\nINSERT INTO t VALUES ('a;b');\nALTER TABLE t ADD COLUMN c INT COMMENT 'x; y';";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].column, "c");
        assert_eq!(clauses[0].definition, "INT COMMENT 'x; y'");
    }

    #[test]
    fn test_malformed_clauses_are_not_extracted() {
        let sql = "ALTER TABLE t ADD COLUMN a, ADD COLUMN (b INT, c INT), ADD COLUMN d FIRST, ADD e INT;";
        assert!(extract_add_column_clauses(sql).is_empty());

        for sql in [
            "ALTER TABLE t ADD COLUMN bio TEXT AFTER;",
            "ALTER TABLE t ADD COLUMN bio TEXT AFTER 'name';",
            "ALTER TABLE t ADD COLUMN bio TEXT AFTER name NOT NULL;",
            "ALTER TABLE t ADD COLUMN bio TEXT FIRST NOT NULL;",
        ] {
            assert!(extract_add_column_clauses(sql).is_empty(), "{sql}");
        }
    }

    #[test]
    fn test_statement_without_terminator() {
        let sql = "ALTER TABLE t ADD COLUMN a INT";
        let clauses = extract_add_column_clauses(sql);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].span, Span::new(14, 30));
    }

    #[test]
    fn test_positioning_display() {
        assert_eq!(Positioning::First.to_string(), "FIRST");
        assert_eq!(
            Positioning::After("name".to_string()).to_string(),
            "AFTER `name`"
        );
        assert!(Positioning::After("Name".to_string())
            .matches(&Positioning::After("name".to_string())));
        assert!(!Positioning::First.matches(&Positioning::After("a".to_string())));
    }
}
