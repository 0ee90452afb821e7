//! SQL lexer for MySQL DDL.
//!
//! A hand-written lexer producing tokens with byte spans. The fixer works on
//! token structure but edits the original text through spans, so anything it
//! does not touch (whitespace, comments, unrelated statements) is kept as is.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
