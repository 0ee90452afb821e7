use std::path::{Path, PathBuf};

use colsync_core::SchemaAnalysis;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::store::MigrationStore;

/// Outcome of fixing one migration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFixResult {
    /// Migration script that was fixed.
    pub path: PathBuf,
    /// Script before the fix.
    pub original: String,
    /// Script after the fix.
    pub fixed: String,
    /// One description per rewritten clause.
    pub changes: Vec<String>,
}

/// Adds positioning clauses to the `ADD COLUMN` statements of a migration.
///
/// Uses `migration` when given, otherwise the store's latest migration. The
/// file is rewritten unless `dry_run` is set. Returns `None` when the script
/// needs no change.
///
/// # Errors
///
/// Unsupported provider or schema errors (before any file is touched),
/// missing migrations, and IO errors.
pub fn fix_migration(
    schema: &SchemaAnalysis,
    store: &MigrationStore,
    migration: Option<&Path>,
    dry_run: bool,
) -> Result<Option<MigrationFixResult>> {
    schema.ensure_usable()?;

    let path = match migration {
        Some(path) => path.to_path_buf(),
        None => store.latest_migration()?,
    };
    let original = store.read(&path)?;

    let Some(fix) = colsync_core::fix(&original, schema)? else {
        info!(path = %path.display(), "Column positions already correct");
        return Ok(None);
    };

    for change in &fix.changes {
        debug!("{change}");
    }
    if dry_run {
        info!(path = %path.display(), changes = fix.changes.len(), "Dry run, migration not written");
    } else {
        store.write(&path, &fix.sql)?;
        info!(path = %path.display(), changes = fix.changes.len(), "Migration updated");
    }

    Ok(Some(MigrationFixResult {
        path,
        original,
        fixed: fix.sql,
        changes: fix.changes,
    }))
}
