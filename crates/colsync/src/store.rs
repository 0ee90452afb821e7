//! Migration files on disk.
//!
//! Migrations follow the Prisma layout: one directory per migration, named
//! `<timestamp>_<name>`, holding a single `migration.sql`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, SyncError};

/// File name of the SQL script inside a migration directory.
pub const MIGRATION_FILE: &str = "migration.sql";

/// Reads and writes migration scripts under one directory.
#[derive(Debug, Clone)]
pub struct MigrationStore {
    dir: PathBuf,
}

impl MigrationStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the most recent migration script.
    ///
    /// Directory names start with a sortable timestamp, so the greatest
    /// name is the latest migration. Directories without a
    /// `migration.sql` (such as a lock file's parent) are ignored.
    pub fn latest_migration(&self) -> Result<PathBuf> {
        if !self.dir.is_dir() {
            return Err(SyncError::MigrationsDirNotFound(self.dir.clone()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().join(MIGRATION_FILE).is_file() {
                names.push(entry.file_name());
            }
        }
        names.sort();

        let latest = names
            .pop()
            .ok_or_else(|| SyncError::NoMigrations(self.dir.clone()))?;
        Ok(self.dir.join(latest).join(MIGRATION_FILE))
    }

    /// Reads a migration script.
    pub fn read(&self, path: &Path) -> Result<String> {
        debug!(path = %path.display(), "Reading migration");
        Ok(fs::read_to_string(path)?)
    }

    /// Replaces a migration script.
    ///
    /// The content goes to a temporary file next to `path` first and is then
    /// renamed over it, so a failed write leaves the original intact.
    pub fn write(&self, path: &Path, sql: &str) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(parent)?;
        file.write_all(sql.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = sql.len(), "Wrote migration");
        Ok(())
    }

    /// Creates `<dir>/<YYYYmmddHHMMSS>_<name>/migration.sql` stamped with
    /// the current UTC time.
    pub fn create_migration(&self, name: &str, sql: &str) -> Result<PathBuf> {
        self.create_migration_at(name, sql, Utc::now())
    }

    /// Like [`Self::create_migration`], with an explicit timestamp.
    pub fn create_migration_at(
        &self,
        name: &str,
        sql: &str,
        created_at: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let dir_name = format!("{}_{name}", created_at.format("%Y%m%d%H%M%S"));
        let migration_dir = self.dir.join(dir_name);
        if migration_dir.exists() {
            return Err(SyncError::MigrationExists(migration_dir));
        }
        fs::create_dir_all(&migration_dir)?;

        let path = migration_dir.join(MIGRATION_FILE);
        self.write(&path, sql)?;
        Ok(path)
    }
}
