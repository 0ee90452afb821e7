use colsync_core::reorder::plan_model;
use colsync_core::schema::Model;
use colsync_core::{ReorderPlan, SchemaReader};
use serde::Serialize;
use tracing::{debug, info};

use crate::connector::MetadataSource;
use crate::error::{Result, SyncError};

/// Reorder plans for every table whose column order differs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// One plan per table that needs changes, in schema order.
    pub plans: Vec<ReorderPlan>,
}

impl SyncReport {
    /// True when every table already matches the schema.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Total number of column moves.
    pub fn change_count(&self) -> usize {
        self.plans.iter().map(|p| p.changes.len()).sum()
    }

    /// All statements, in application order.
    pub fn statements(&self) -> impl Iterator<Item = &str> {
        self.plans.iter().flat_map(|p| p.sql.iter().map(String::as_str))
    }

    /// Migration script: the statements grouped by table.
    pub fn migration_sql(&self) -> String {
        let mut sql = String::new();
        for plan in &self.plans {
            if !sql.is_empty() {
                sql.push('\n');
            }
            sql.push_str(&format!("-- Reorder columns of `{}`\n", plan.table));
            for statement in &plan.sql {
                sql.push_str(statement);
                sql.push('\n');
            }
        }
        sql
    }
}

/// Compares the schema's column order with the database and plans the moves.
///
/// With `model` set only that model is checked. Stops at the first table
/// that fails.
///
/// # Errors
///
/// Unsupported provider or schema errors (before any query),
/// [`colsync_core::Error::ModelNotFound`] for an unknown `model`,
/// [`SyncError::TableNotFound`] when a model's table is missing, and any
/// database error.
pub async fn plan_reorder<S: MetadataSource>(
    schema: &SchemaReader,
    source: &S,
    model: Option<&str>,
) -> Result<SyncReport> {
    schema.analysis().ensure_usable()?;

    let models: Vec<&Model> = match model {
        Some(name) => vec![schema.model(name)?],
        None => schema.analysis().models.iter().collect(),
    };

    let mut report = SyncReport::default();
    for model in models {
        let table = model.table_name.as_str();
        debug!(model = %model.name, table, "Checking column order");

        if !source.table_exists(table).await? {
            return Err(SyncError::TableNotFound {
                model: model.name.clone(),
                table: table.to_string(),
            });
        }
        let metadata = source.table_metadata(table).await?;
        let plan = plan_model(schema, &model.name, &metadata)?;

        if plan.is_empty() {
            debug!(table, "Column order already matches");
            continue;
        }
        info!(table, moves = plan.changes.len(), "Column order differs");
        for change in &plan.changes {
            debug!(table, "{}", change.describe());
        }
        report.plans.push(plan);
    }

    Ok(report)
}
