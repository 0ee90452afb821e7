//! Rendering of complete column definitions.
//!
//! `MODIFY COLUMN` replaces the whole column definition, so the statement has
//! to restate every attribute the column currently has. [`RawColumn`] carries
//! the values `information_schema.COLUMNS` reports and
//! [`RawColumn::definition`] turns them back into DDL.

use serde::{Deserialize, Serialize};

use crate::provider::DatabaseProvider;

/// Default expressions that are written without quotes.
const DEFAULT_KEYWORDS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_DATE",
    "CURRENT_TIME",
    "LOCALTIME",
    "LOCALTIMESTAMP",
    "NOW",
    "NULL",
    "TRUE",
    "FALSE",
];

/// Returns true if `raw` is a keyword default such as `CURRENT_TIMESTAMP`,
/// `current_timestamp(3)` or `NOW()`.
#[must_use]
pub fn is_default_keyword(raw: &str) -> bool {
    let raw = raw.trim();
    let name = raw.split('(').next().unwrap_or(raw).trim();
    let has_valid_tail = raw[name.len()..].trim().is_empty() || raw.ends_with(')');
    has_valid_tail && DEFAULT_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// Returns true for literals that must not be quoted: numbers and
/// bit/hex literals (`b'101'`, `0x1F`, `x'1F'`).
fn is_bare_literal(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    let numeric = raw.parse::<f64>().is_ok()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'));
    let bit_or_hex = (lower.starts_with("b'") || lower.starts_with("x'")) && lower.ends_with('\'');
    let hex_number = lower
        .strip_prefix("0x")
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()));
    numeric || bit_or_hex || hex_number
}

/// Quotes `value` as a single-quoted SQL string.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Renders a default value reported by the server as a SQL literal.
///
/// Keywords, numbers and bit/hex literals are written bare, anything else is
/// quoted as a string.
#[must_use]
pub fn render_default(raw: &str, is_keyword: bool) -> String {
    if is_keyword || is_bare_literal(raw) {
        raw.to_string()
    } else {
        quote_string(raw)
    }
}

/// How a column's data type treats literal defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer, fixed/floating point, `bit` and `year` columns.
    Numeric,
    /// `date`, `time`, `datetime` and `timestamp` columns.
    Temporal,
    /// Character, binary, `enum` and `set` columns: defaults are always strings.
    Text,
    /// Anything else (`json`, spatial types, ...).
    Other,
}

impl ColumnKind {
    /// Classifies a `COLUMN_TYPE` such as `varchar(191)` or `int unsigned`.
    #[must_use]
    pub fn from_column_type(column_type: &str) -> Self {
        let lower = column_type.trim().to_ascii_lowercase();
        let base = lower
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or_default();
        match base {
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "bigint" | "decimal"
            | "dec" | "numeric" | "fixed" | "float" | "double" | "real" | "bit" | "bool"
            | "boolean" | "year" => Self::Numeric,
            "date" | "time" | "datetime" | "timestamp" => Self::Temporal,
            "char" | "varchar" | "binary" | "varbinary" | "tinytext" | "text" | "mediumtext"
            | "longtext" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "enum" | "set" => {
                Self::Text
            }
            _ => Self::Other,
        }
    }

    /// Renders a literal (non-expression) default for a column of this kind.
    ///
    /// Text columns always get a quoted string, so `'007'` or `'NULL'` keep
    /// their meaning. Keywords stay bare only on temporal columns and numbers
    /// only on numeric ones.
    #[must_use]
    pub fn render_default(self, raw: &str) -> String {
        match self {
            Self::Text => quote_string(raw),
            Self::Temporal => render_default(raw, is_default_keyword(raw)),
            Self::Numeric => render_default(raw, false),
            Self::Other => render_default(raw, is_default_keyword(raw)),
        }
    }
}

/// A column as reported by `information_schema.COLUMNS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    /// `COLUMN_NAME`.
    pub name: String,
    /// `ORDINAL_POSITION` (1-based).
    pub position: u32,
    /// `COLUMN_TYPE`, e.g. `varchar(191)` or `int unsigned`.
    pub column_type: String,
    /// `IS_NULLABLE = 'YES'`.
    pub nullable: bool,
    /// `COLUMN_DEFAULT`.
    pub default: Option<String>,
    /// `EXTRA`, e.g. `auto_increment` or `DEFAULT_GENERATED on update CURRENT_TIMESTAMP`.
    pub extra: String,
    /// `COLUMN_KEY`: `PRI`, `UNI`, `MUL` or empty.
    pub key: String,
    /// `COLUMN_COMMENT`.
    pub comment: String,
    /// `CHARACTER_SET_NAME`.
    pub character_set: Option<String>,
    /// `COLLATION_NAME`.
    pub collation: Option<String>,
    /// `GENERATION_EXPRESSION` (empty for ordinary columns).
    pub generation_expression: Option<String>,
}

impl RawColumn {
    /// Whether `EXTRA` contains the given flag (case-insensitive).
    fn has_extra(&self, flag: &str) -> bool {
        self.extra
            .to_ascii_lowercase()
            .contains(&flag.to_ascii_lowercase())
    }

    /// Returns the `ON UPDATE` expression from `EXTRA`, if any.
    fn on_update(&self) -> Option<&str> {
        let lower = self.extra.to_ascii_lowercase();
        let index = lower.find("on update ")?;
        let expr = self.extra[index + "on update ".len()..].trim();
        (!expr.is_empty()).then_some(expr)
    }

    /// Returns `VIRTUAL` or `STORED` for generated columns.
    fn generated_kind(&self) -> Option<&'static str> {
        if self.has_extra("virtual generated") {
            Some("VIRTUAL")
        } else if self.has_extra("stored generated") || self.has_extra("persistent generated") {
            Some("STORED")
        } else {
            None
        }
    }

    fn default_clause(&self, provider: DatabaseProvider) -> Option<String> {
        let Some(raw) = self.default.as_deref() else {
            return self.nullable.then(|| "DEFAULT NULL".to_string());
        };

        let rendered = match provider {
            // MariaDB reports defaults as SQL: literals already quoted,
            // NULL as the keyword, expressions verbatim.
            DatabaseProvider::MariaDb => {
                if raw.eq_ignore_ascii_case("NULL") && !self.nullable {
                    return None;
                }
                raw.to_string()
            }
            DatabaseProvider::MySql => {
                if self.has_extra("default_generated") {
                    if is_default_keyword(raw) {
                        raw.to_string()
                    } else {
                        format!("({raw})")
                    }
                } else {
                    ColumnKind::from_column_type(&self.column_type).render_default(raw)
                }
            }
        };
        Some(format!("DEFAULT {rendered}"))
    }

    /// Renders the full definition that follows the column name in DDL.
    #[must_use]
    pub fn definition(&self, provider: DatabaseProvider) -> String {
        let mut parts = vec![self.column_type.clone()];

        if let Some(charset) = self.character_set.as_deref() {
            parts.push(format!("CHARACTER SET {charset}"));
        }
        if let Some(collation) = self.collation.as_deref() {
            parts.push(format!("COLLATE {collation}"));
        }

        let generated = self.generated_kind().zip(
            self.generation_expression
                .as_deref()
                .filter(|e| !e.trim().is_empty()),
        );
        if let Some((kind, expr)) = generated {
            parts.push(format!("GENERATED ALWAYS AS ({expr}) {kind}"));
        }

        parts.push(if self.nullable { "NULL" } else { "NOT NULL" }.to_string());

        if generated.is_none() {
            if let Some(default) = self.default_clause(provider) {
                parts.push(default);
            }
        }
        if self.has_extra("auto_increment") {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if let Some(expr) = self.on_update() {
            parts.push(format!("ON UPDATE {expr}"));
        }
        if self.has_extra("invisible") {
            parts.push("INVISIBLE".to_string());
        }
        if !self.comment.is_empty() {
            parts.push(format!("COMMENT {}", quote_string(&self.comment)));
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(column_type: &str) -> RawColumn {
        RawColumn {
            name: "c".to_string(),
            position: 1,
            column_type: column_type.to_string(),
            ..RawColumn::default()
        }
    }

    #[test]
    fn test_render_default() {
        assert_eq!(render_default("CURRENT_TIMESTAMP", true), "CURRENT_TIMESTAMP");
        assert_eq!(render_default("42", false), "42");
        assert_eq!(render_default("-1.5", false), "-1.5");
        assert_eq!(render_default("b'1'", false), "b'1'");
        assert_eq!(render_default("pending", false), "'pending'");
        assert_eq!(render_default("it's", false), "'it''s'");
        assert_eq!(render_default("NaN", false), "'NaN'");
    }

    #[test]
    fn test_column_kind_from_type() {
        assert_eq!(ColumnKind::from_column_type("int unsigned"), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_column_type("DECIMAL(10,2)"), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_column_type("bit(1)"), ColumnKind::Numeric);
        assert_eq!(ColumnKind::from_column_type("datetime(3)"), ColumnKind::Temporal);
        assert_eq!(ColumnKind::from_column_type("varchar(191)"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_column_type("enum('a','b')"), ColumnKind::Text);
        assert_eq!(ColumnKind::from_column_type("json"), ColumnKind::Other);
    }

    #[test]
    fn test_string_defaults_that_look_like_literals_stay_quoted() {
        for (raw, expected) in [
            ("007", "'007'"),
            ("TRUE", "'TRUE'"),
            ("NULL", "'NULL'"),
            ("now", "'now'"),
            ("1e3", "'1e3'"),
            ("CURRENT_TIMESTAMP", "'CURRENT_TIMESTAMP'"),
        ] {
            let col = RawColumn {
                default: Some(raw.to_string()),
                ..column("varchar(10)")
            };
            assert_eq!(
                col.definition(DatabaseProvider::MySql),
                format!("varchar(10) NOT NULL DEFAULT {expected}")
            );
        }
    }

    #[test]
    fn test_numeric_and_temporal_defaults() {
        let number = RawColumn {
            default: Some("7".to_string()),
            ..column("int")
        };
        let bit = RawColumn {
            default: Some("b'1'".to_string()),
            ..column("bit(1)")
        };
        let date = RawColumn {
            default: Some("2020-01-01 00:00:00".to_string()),
            ..column("datetime")
        };
        let keyword = RawColumn {
            default: Some("CURRENT_TIMESTAMP".to_string()),
            ..column("timestamp")
        };
        let boolean_text = RawColumn {
            default: Some("TRUE".to_string()),
            ..column("tinyint(1)")
        };
        assert_eq!(number.definition(DatabaseProvider::MySql), "int NOT NULL DEFAULT 7");
        assert_eq!(bit.definition(DatabaseProvider::MySql), "bit(1) NOT NULL DEFAULT b'1'");
        assert_eq!(
            date.definition(DatabaseProvider::MySql),
            "datetime NOT NULL DEFAULT '2020-01-01 00:00:00'"
        );
        assert_eq!(
            keyword.definition(DatabaseProvider::MySql),
            "timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );
        assert_eq!(
            boolean_text.definition(DatabaseProvider::MySql),
            "tinyint(1) NOT NULL DEFAULT 'TRUE'"
        );
    }

    #[test]
    fn test_is_default_keyword() {
        assert!(is_default_keyword("CURRENT_TIMESTAMP"));
        assert!(is_default_keyword("current_timestamp(3)"));
        assert!(is_default_keyword("now()"));
        assert!(!is_default_keyword("CURRENT_TIMESTAMP_X"));
        assert!(!is_default_keyword("active"));
    }

    #[test]
    fn test_auto_increment_is_kept() {
        let col = RawColumn {
            extra: "auto_increment".to_string(),
            key: "PRI".to_string(),
            ..column("int")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "int NOT NULL AUTO_INCREMENT"
        );
    }

    #[test]
    fn test_timestamp_with_on_update() {
        let col = RawColumn {
            default: Some("CURRENT_TIMESTAMP(3)".to_string()),
            extra: "DEFAULT_GENERATED on update CURRENT_TIMESTAMP(3)".to_string(),
            ..column("datetime(3)")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3) ON UPDATE CURRENT_TIMESTAMP(3)"
        );
    }

    #[test]
    fn test_expression_default_is_parenthesised() {
        let col = RawColumn {
            default: Some("uuid()".to_string()),
            extra: "DEFAULT_GENERATED".to_string(),
            ..column("char(36)")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "char(36) NOT NULL DEFAULT (uuid())"
        );
    }

    #[test]
    fn test_nullable_string_with_charset_and_comment() {
        let col = RawColumn {
            nullable: true,
            character_set: Some("utf8mb4".to_string()),
            collation: Some("utf8mb4_unicode_ci".to_string()),
            comment: "user's bio".to_string(),
            ..column("varchar(191)")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "varchar(191) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NULL DEFAULT NULL COMMENT 'user''s bio'"
        );
    }

    #[test]
    fn test_mysql_string_default_is_quoted() {
        let col = RawColumn {
            default: Some("draft".to_string()),
            ..column("enum('draft','published')")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "enum('draft','published') NOT NULL DEFAULT 'draft'"
        );
    }

    #[test]
    fn test_mariadb_defaults_pass_through() {
        let quoted = RawColumn {
            default: Some("'draft'".to_string()),
            ..column("varchar(20)")
        };
        let expression = RawColumn {
            default: Some("current_timestamp()".to_string()),
            extra: "on update current_timestamp()".to_string(),
            ..column("timestamp")
        };
        let null = RawColumn {
            nullable: true,
            default: Some("NULL".to_string()),
            ..column("int(11)")
        };
        assert_eq!(
            quoted.definition(DatabaseProvider::MariaDb),
            "varchar(20) NOT NULL DEFAULT 'draft'"
        );
        assert_eq!(
            expression.definition(DatabaseProvider::MariaDb),
            "timestamp NOT NULL DEFAULT current_timestamp() ON UPDATE current_timestamp()"
        );
        assert_eq!(
            null.definition(DatabaseProvider::MariaDb),
            "int(11) NULL DEFAULT NULL"
        );
    }

    #[test]
    fn test_generated_column() {
        let col = RawColumn {
            nullable: true,
            extra: "STORED GENERATED".to_string(),
            generation_expression: Some("(`price` * `qty`)".to_string()),
            ..column("decimal(10,2)")
        };
        assert_eq!(
            col.definition(DatabaseProvider::MySql),
            "decimal(10,2) GENERATED ALWAYS AS ((`price` * `qty`)) STORED NULL"
        );
    }
}
