//! Positioning repair for `ADD COLUMN` statements in migration SQL.
//!
//! Migration generators append new columns at the end of the table. [`fix`]
//! finds every `ALTER TABLE ... ADD COLUMN` clause, looks the column up in the
//! schema and appends `FIRST` or ``AFTER `<previous column>` `` when the
//! column belongs somewhere else. Only the definition text of a rewritten
//! clause changes; every other byte of the script is kept.
//!
//! ```rust
//! use colsync_core::fixer::fix;
//! use colsync_core::schema::SchemaReader;
//!
//! let schema = SchemaReader::parse(r#"
//! datasource db {
//!   provider = "mysql"
//! }
//! model User {
//!   id    Int    @id
//!   name  String
//!   bio   String?
//!   email String
//! }
//! "#);
//!
//! let fixed = fix("ALTER TABLE `User` ADD COLUMN `bio` TEXT;", schema.analysis())
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(fixed.sql, "ALTER TABLE `User` ADD COLUMN `bio` TEXT AFTER `name`;");
//! ```

mod scanner;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use scanner::{extract_add_column_clauses, AddColumnClause, Positioning};

use crate::error::Result;
use crate::lexer::Span;
use crate::schema::SchemaAnalysis;

/// Where a column belongs according to the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPosition {
    /// 0-based index among the table's physical columns.
    pub index: usize,
    /// Number of physical columns the table declares.
    pub count: usize,
    /// Physical column declared just before this one.
    pub predecessor: Option<String>,
}

impl ColumnPosition {
    /// Whether the column is declared last.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// The positioning clause that puts the column in place.
    #[must_use]
    pub fn positioning(&self) -> Positioning {
        self.predecessor
            .clone()
            .map_or(Positioning::First, Positioning::After)
    }
}

/// Declared positions keyed by lowercase `(table, column)`.
#[derive(Debug, Clone, Default)]
pub struct ColumnPositions {
    positions: HashMap<(String, String), ColumnPosition>,
}

impl ColumnPositions {
    /// Indexes every physical column of every model. When two models map to
    /// the same table the first one wins.
    #[must_use]
    pub fn from_analysis(analysis: &SchemaAnalysis) -> Self {
        let mut positions = HashMap::new();
        for model in &analysis.models {
            let columns = model.column_order();
            let table = model.table_name.to_lowercase();
            for (index, column) in columns.iter().enumerate() {
                let predecessor = index.checked_sub(1).map(|p| columns[p].clone());
                positions
                    .entry((table.clone(), column.to_lowercase()))
                    .or_insert(ColumnPosition {
                        index,
                        count: columns.len(),
                        predecessor,
                    });
            }
        }
        Self { positions }
    }

    /// Looks a column up, ignoring case.
    #[must_use]
    pub fn lookup(&self, table: &str, column: &str) -> Option<&ColumnPosition> {
        self.positions
            .get(&(table.to_lowercase(), column.to_lowercase()))
    }
}

/// Decides the positioning a clause should end up with, or `None` to leave
/// it alone.
fn decide(clause: &AddColumnClause, position: &ColumnPosition) -> Option<Positioning> {
    // Appending is already right for the last column.
    if position.is_last() && clause.positioning.is_none() {
        return None;
    }
    let expected = position.positioning();
    match &clause.positioning {
        Some(existing) if existing.matches(&expected) => None,
        _ => Some(expected),
    }
}

/// A rewritten migration script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFix {
    /// Script with positioning clauses applied.
    pub sql: String,
    /// One description per rewritten clause, in source order.
    pub changes: Vec<String>,
}

/// Rewrites mis-positioned `ADD COLUMN` clauses in `sql`.
///
/// Returns `Ok(None)` when there is nothing to change. Columns the schema
/// does not declare are left as they are. Running the result through `fix`
/// again yields `Ok(None)`.
///
/// # Errors
///
/// [`crate::Error::UnsupportedProvider`] if the schema is not for MySQL or
/// MariaDB; checked before the SQL is looked at.
pub fn fix(sql: &str, analysis: &SchemaAnalysis) -> Result<Option<MigrationFix>> {
    analysis.provider()?;

    let clauses = extract_add_column_clauses(sql);
    if clauses.is_empty() {
        return Ok(None);
    }

    let positions = ColumnPositions::from_analysis(analysis);
    let mut edits: Vec<(Span, String)> = Vec::new();
    let mut changes = Vec::new();

    for clause in &clauses {
        let Some(position) = positions.lookup(&clause.table, &clause.column) else {
            continue;
        };
        let Some(positioning) = decide(clause, position) else {
            continue;
        };
        edits.push((
            clause.definition_span,
            format!("{} {positioning}", clause.base_definition(sql)),
        ));
        changes.push(format!(
            "Fixed column position for {}.{} ({positioning})",
            clause.table, clause.column
        ));
    }

    if edits.is_empty() {
        return Ok(None);
    }

    let mut fixed = sql.to_string();
    for (span, replacement) in edits.iter().rev() {
        fixed.replace_range(span.start..span.end, replacement);
    }

    Ok(Some(MigrationFix {
        sql: fixed,
        changes,
    }))
}
