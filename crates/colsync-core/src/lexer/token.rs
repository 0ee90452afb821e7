//! Token types for the DDL lexer.

use super::Span;

/// Keywords the migration scanner cares about.
///
/// Anything else lexes as an [`TokenKind::Identifier`]; MySQL keywords are not
/// reserved in most positions, so the scanner decides from context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Alter,
    Online,
    Ignore,
    Table,
    Add,
    Column,
    If,
    Not,
    Exists,
    First,
    After,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALTER" => Some(Self::Alter),
            "ONLINE" => Some(Self::Online),
            "IGNORE" => Some(Self::Ignore),
            "TABLE" => Some(Self::Table),
            "ADD" => Some(Self::Add),
            "COLUMN" => Some(Self::Column),
            "IF" => Some(Self::If),
            "NOT" => Some(Self::Not),
            "EXISTS" => Some(Self::Exists),
            "FIRST" => Some(Self::First),
            "AFTER" => Some(Self::After),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Alter => "ALTER",
            Self::Online => "ONLINE",
            Self::Ignore => "IGNORE",
            Self::Table => "TABLE",
            Self::Add => "ADD",
            Self::Column => "COLUMN",
            Self::If => "IF",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
            Self::First => "FIRST",
            Self::After => "AFTER",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Numeric literal, kept as written (e.g. `42`, `1.5e3`, `0x1F`).
    Number(String),
    /// String literal with escapes resolved (`'it''s'` → `it's`).
    String(String),
    /// Identifier, unquoted or quoted with backticks.
    Identifier {
        /// Identifier text with quotes stripped and doubled backticks resolved.
        name: String,
        /// Whether the identifier was written in backticks.
        quoted: bool,
    },
    /// A keyword from [`Keyword`].
    Keyword(Keyword),

    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// Any other single character (operators, `@`, `=` ...).
    Symbol(char),

    /// End of input
    Eof,
    /// Invalid input, e.g. an unterminated string. Runs to end of input.
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.as_keyword() == Some(keyword)
    }

    /// Returns the name this token denotes when used as an identifier.
    ///
    /// Unquoted keywords are accepted too (`ADD COLUMN first INT` is valid
    /// MySQL); the original spelling is taken from `source`.
    #[must_use]
    pub fn identifier_name<'s>(&'s self, source: &'s str) -> Option<&'s str> {
        match &self.kind {
            TokenKind::Identifier { name, .. } => Some(name),
            TokenKind::Keyword(_) => Some(self.span.slice(source)),
            _ => None,
        }
    }
}
