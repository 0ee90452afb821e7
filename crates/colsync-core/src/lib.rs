//! # colsync-core
//!
//! Column-order reconciliation for MySQL and MariaDB.
//!
//! This crate provides:
//! - A Prisma-style schema reader that yields each table's declared column order
//! - An order comparator producing the moves that bring a live table in line
//! - A `MODIFY COLUMN ... FIRST | AFTER` generator that restates full column
//!   definitions
//! - A migration fixer that adds positioning to `ADD COLUMN` clauses without
//!   touching anything else in the script
//!
//! Everything here is pure: no database access and no file I/O.
//!
//! ## Reordering a table
//!
//! ```rust
//! use colsync_core::order::compute_moves;
//!
//! let expected = ["id", "email", "name", "createdAt"].map(String::from);
//! let current = ["createdAt", "email", "id", "name"].map(String::from);
//!
//! let moves = compute_moves(&expected, &current);
//! let moved: Vec<_> = moves.iter().map(|m| m.column.as_str()).collect();
//! assert_eq!(moved, ["id", "email", "name"]);
//! ```

pub mod definition;
pub mod error;
pub mod fixer;
pub mod lexer;
pub mod order;
pub mod provider;
pub mod reorder;
pub mod schema;

pub use error::{Error, Result};
pub use fixer::{fix, MigrationFix};
pub use order::{compute_moves, ColumnChange};
pub use provider::{DatabaseProvider, SUPPORTED_PROVIDERS};
pub use reorder::{ColumnMetadata, ReorderPlan, TableMetadata};
pub use schema::{SchemaAnalysis, SchemaReader};
