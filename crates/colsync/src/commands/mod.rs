//! The `sync` and `fix-migration` commands, independent of the CLI.

mod fix;
mod sync;

use std::fs;
use std::path::Path;

use colsync_core::SchemaReader;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

pub use fix::{fix_migration, MigrationFixResult};
pub use sync::{plan_reorder, SyncReport};

/// Reads a schema file and checks it is usable.
///
/// # Errors
///
/// IO errors, an unsupported provider, or syntax errors in the schema.
pub fn load_schema(path: &Path) -> Result<SchemaReader> {
    debug!(path = %path.display(), "Reading schema");
    let reader = SchemaReader::parse(&fs::read_to_string(path)?);
    let provider = reader.analysis().ensure_usable()?;
    debug!(
        %provider,
        models = reader.analysis().models.len(),
        "Schema loaded"
    );
    Ok(reader)
}

/// Pretty-printed JSON for `--json` output.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
