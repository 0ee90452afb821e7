//! Keep MySQL/MariaDB column order in sync with a schema file.
//!
//! `colsync` wires the pure engine in `colsync-core` to the outside world:
//!
//! - **Connector** - reads live column metadata from `information_schema`
//! - **Store** - finds, reads and writes Prisma-style migration files
//! - **Commands** - `sync` (plan `MODIFY COLUMN` moves) and `fix-migration`
//!   (position `ADD COLUMN` clauses)
//!
//! # CLI Usage
//!
//! ```bash
//! # Write a migration that reorders live columns to match the schema
//! colsync sync
//!
//! # Print the statements for one model without writing anything
//! colsync sync --model User --dry-run
//!
//! # Fix the latest migration's ADD COLUMN positions in place
//! colsync fix-migration
//! ```

pub mod commands;
pub mod connector;
pub mod error;
pub mod store;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        fix_migration, load_schema, plan_reorder, MigrationFixResult, SyncReport,
    };
    pub use crate::connector::{MetadataSource, MySqlConnector};
    pub use crate::error::{Result, SyncError};
    pub use crate::store::MigrationStore;
    pub use colsync_core::{
        ColumnChange, ColumnMetadata, DatabaseProvider, ReorderPlan, SchemaAnalysis,
        SchemaReader, TableMetadata,
    };
}
