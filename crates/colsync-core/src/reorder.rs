//! `MODIFY COLUMN` generation for column reordering.
//!
//! Given the declared column order of a table and its live column metadata,
//! [`generate`] emits one non-destructive statement per required move:
//!
//! ```sql
//! ALTER TABLE `users` MODIFY COLUMN `id` int NOT NULL AUTO_INCREMENT FIRST;
//! ALTER TABLE `users` MODIFY COLUMN `email` varchar(191) NOT NULL AFTER `id`;
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::definition::RawColumn;
use crate::error::Result;
use crate::order::{common_orders, compute_moves, ColumnChange};
use crate::provider::DatabaseProvider;
use crate::schema::SchemaReader;

/// A live column with its complete physical definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Everything that follows the column name in a column definition:
    /// type, nullability, default, `AUTO_INCREMENT` and other attributes.
    pub definition: String,
    /// Part of the primary key.
    pub is_primary_key: bool,
    /// Has a single-column unique index.
    pub is_unique: bool,
    /// Has `AUTO_INCREMENT`.
    pub is_auto_increment: bool,
    /// 1-based ordinal position.
    pub position: u32,
}

impl ColumnMetadata {
    /// Builds metadata from an `information_schema` row.
    #[must_use]
    pub fn from_raw(raw: &RawColumn, provider: DatabaseProvider) -> Self {
        Self {
            name: raw.name.clone(),
            definition: raw.definition(provider),
            is_primary_key: raw.key.eq_ignore_ascii_case("PRI"),
            is_unique: raw.key.eq_ignore_ascii_case("UNI"),
            is_auto_increment: raw.extra.to_ascii_lowercase().contains("auto_increment"),
            position: raw.position,
        }
    }
}

/// A live table and its columns, sorted by ordinal position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Columns in physical order.
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Creates table metadata, sorting the columns by position.
    #[must_use]
    pub fn new(name: impl Into<String>, mut columns: Vec<ColumnMetadata>) -> Self {
        columns.sort_by_key(|c| c.position);
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Column names in physical order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// The moves and statements needed to reorder one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderPlan {
    /// Table name.
    pub table: String,
    /// Columns to move, in application order.
    pub changes: Vec<ColumnChange>,
    /// One `ALTER TABLE` statement per change.
    pub sql: Vec<String>,
}

impl ReorderPlan {
    /// True when the table is already in declared order.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Quotes an identifier with backticks.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Builds the reorder statements for one table.
///
/// `expected_order` holds physical column names. Columns missing from the
/// live table are ignored, as are live columns the order does not mention.
/// Each statement restates the column's current definition so nothing but
/// its position changes.
#[must_use]
pub fn generate(table: &str, expected_order: &[String], columns: &[ColumnMetadata]) -> ReorderPlan {
    let current: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let (expected, _) = common_orders(expected_order, &current);
    let changes = compute_moves(&expected, &current);
    let by_name: HashMap<&str, &ColumnMetadata> =
        columns.iter().map(|c| (c.name.as_str(), c)).collect();

    let mut sql = Vec::with_capacity(changes.len());
    for change in &changes {
        let Some(column) = by_name.get(change.column.as_str()) else {
            continue;
        };
        let position = match change.to_position.checked_sub(1) {
            None => "FIRST".to_string(),
            Some(previous) => format!("AFTER {}", quote_identifier(&expected[previous])),
        };
        sql.push(format!(
            "ALTER TABLE {} MODIFY COLUMN {} {} {};",
            quote_identifier(table),
            quote_identifier(&column.name),
            column.definition,
            position
        ));
    }

    ReorderPlan {
        table: table.to_string(),
        changes,
        sql,
    }
}

/// Builds the reorder plan for a schema model against its live table.
///
/// Field names are mapped to column names through the schema's rename
/// directives; the SQL uses column names while each change also records the
/// logical field name for reporting.
///
/// # Errors
///
/// [`crate::Error::ModelNotFound`] if the model does not exist.
pub fn plan_model(schema: &SchemaReader, model: &str, table: &TableMetadata) -> Result<ReorderPlan> {
    let model = schema.model(model)?;
    let field_by_column: HashMap<&str, &str> = model
        .column_fields()
        .map(|f| (f.column_name.as_str(), f.name.as_str()))
        .collect();

    let mut plan = generate(&table.name, &model.column_order(), &table.columns);
    for change in &mut plan.changes {
        if let Some(field) = field_by_column.get(change.column.as_str()) {
            change.field = (*field).to_string();
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, definition: &str, position: u32) -> ColumnMetadata {
        ColumnMetadata {
            name: name.to_string(),
            definition: definition.to_string(),
            is_primary_key: false,
            is_unique: false,
            is_auto_increment: false,
            position,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_generate_first_and_after() {
        let columns = vec![
            col("name", "varchar(191) NOT NULL", 1),
            col("id", "int NOT NULL AUTO_INCREMENT", 2),
        ];
        let plan = generate("users", &names(&["id", "name"]), &columns);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(
            plan.sql,
            vec!["ALTER TABLE `users` MODIFY COLUMN `id` int NOT NULL AUTO_INCREMENT FIRST;"]
        );
    }

    #[test]
    fn test_after_uses_previous_expected_column() {
        let columns = vec![
            col("a", "int NOT NULL", 1),
            col("legacy", "int NULL DEFAULT NULL", 2),
            col("c", "int NOT NULL", 3),
            col("b", "int NOT NULL", 4),
        ];
        let plan = generate("t", &names(&["a", "b", "c"]), &columns);
        assert_eq!(
            plan.sql,
            vec!["ALTER TABLE `t` MODIFY COLUMN `b` int NOT NULL AFTER `a`;"]
        );
    }

    #[test]
    fn test_generate_nothing_to_do() {
        let columns = vec![col("id", "int NOT NULL", 1), col("name", "text NULL", 2)];
        assert_eq!(
            generate("t", &names(&["id", "name"]), &columns),
            ReorderPlan {
                table: "t".to_string(),
                ..ReorderPlan::default()
            }
        );
        assert!(generate("t", &[], &columns).is_empty());
        assert!(generate("t", &names(&["ghost"]), &columns).sql.is_empty());
    }

    #[test]
    fn test_table_metadata_sorts_columns() {
        let table = TableMetadata::new("t", vec![col("b", "int", 2), col("a", "int", 1)]);
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_from_raw_flags() {
        let raw = RawColumn {
            name: "id".to_string(),
            position: 1,
            column_type: "bigint unsigned".to_string(),
            extra: "auto_increment".to_string(),
            key: "PRI".to_string(),
            ..RawColumn::default()
        };
        let meta = ColumnMetadata::from_raw(&raw, DatabaseProvider::MySql);
        assert!(meta.is_primary_key);
        assert!(meta.is_auto_increment);
        assert!(!meta.is_unique);
        assert_eq!(meta.definition, "bigint unsigned NOT NULL AUTO_INCREMENT");
    }

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
