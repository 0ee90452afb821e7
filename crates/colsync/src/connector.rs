//! Live column metadata from MySQL / MariaDB.
//!
//! [`MetadataSource`] is the seam between the commands and the database;
//! [`MySqlConnector`] implements it over `information_schema`.

use std::future::Future;
use std::time::Duration;

use colsync_core::definition::RawColumn;
use colsync_core::{ColumnMetadata, DatabaseProvider, TableMetadata};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// Reads table metadata from a live database.
#[allow(async_fn_in_trait)]
pub trait MetadataSource {
    /// Returns true if the table exists in the current database.
    async fn table_exists(&self, table: &str) -> Result<bool>;

    /// Returns the table's columns sorted by ordinal position.
    async fn table_metadata(&self, table: &str) -> Result<TableMetadata>;
}

const TABLE_EXISTS_SQL: &str = "SELECT COUNT(*) FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?";

// Everything is cast to CHAR so MySQL 8 (which reports some of these as
// binary strings) and MariaDB decode to the same types.
const COLUMNS_SQL: &str = r"
SELECT
    CAST(COLUMN_NAME AS CHAR),
    CAST(ORDINAL_POSITION AS UNSIGNED),
    CAST(COLUMN_TYPE AS CHAR),
    CAST(IS_NULLABLE AS CHAR),
    CAST(COLUMN_DEFAULT AS CHAR),
    CAST(EXTRA AS CHAR),
    CAST(COLUMN_KEY AS CHAR),
    CAST(COLUMN_COMMENT AS CHAR),
    CAST(CHARACTER_SET_NAME AS CHAR),
    CAST(COLLATION_NAME AS CHAR),
    CAST(GENERATION_EXPRESSION AS CHAR)
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION
";

/// One row of [`COLUMNS_SQL`].
type ColumnRow = (
    String,
    u64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn raw_column(row: ColumnRow) -> RawColumn {
    let (
        name,
        position,
        column_type,
        is_nullable,
        default,
        extra,
        key,
        comment,
        character_set,
        collation,
        generation_expression,
    ) = row;
    RawColumn {
        name,
        position: u32::try_from(position).unwrap_or(u32::MAX),
        column_type,
        nullable: is_nullable.eq_ignore_ascii_case("YES"),
        default,
        extra,
        key,
        comment,
        character_set,
        collation,
        generation_expression: generation_expression.filter(|e| !e.is_empty()),
    }
}

/// Runs a query future, failing with [`SyncError::Timeout`] if it does not
/// finish within `limit`.
pub async fn with_timeout<T, F>(limit: Duration, query: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    tokio::time::timeout(limit, query)
        .await
        .map_err(|_| SyncError::Timeout(limit.as_secs()))?
        .map_err(SyncError::from)
}

/// A single-connection pool to a MySQL or MariaDB server.
pub struct MySqlConnector {
    pool: MySqlPool,
    provider: DatabaseProvider,
    timeout: Duration,
}

impl MySqlConnector {
    /// Connects and detects the server flavour.
    ///
    /// `timeout` bounds connection acquisition and every query.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        debug!(timeout_secs = timeout.as_secs(), "Connecting to database");
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect(url)
            .await?;

        let version = with_timeout(
            timeout,
            sqlx::query_as::<_, (String,)>("SELECT VERSION()").fetch_one(&pool),
        )
        .await;
        let version = match version {
            Ok((version,)) => version,
            Err(e) => {
                pool.close().await;
                return Err(e);
            }
        };

        let provider = DatabaseProvider::from_server_version(&version);
        info!(%provider, %version, "Connected to database");
        Ok(Self {
            pool,
            provider,
            timeout,
        })
    }

    /// Server flavour detected at connect time.
    pub const fn provider(&self) -> DatabaseProvider {
        self.provider
    }

    /// Closes the pool. Safe to call more than once.
    pub async fn disconnect(&self) {
        if !self.pool.is_closed() {
            self.pool.close().await;
            debug!("Disconnected from database");
        }
    }
}

impl MetadataSource for MySqlConnector {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        let (count,): (i64,) = with_timeout(
            self.timeout,
            sqlx::query_as(TABLE_EXISTS_SQL)
                .bind(table)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(count > 0)
    }

    async fn table_metadata(&self, table: &str) -> Result<TableMetadata> {
        let rows: Vec<ColumnRow> = with_timeout(
            self.timeout,
            sqlx::query_as(COLUMNS_SQL)
                .bind(table)
                .fetch_all(&self.pool),
        )
        .await?;

        debug!(table, columns = rows.len(), "Read column metadata");
        let columns = rows
            .into_iter()
            .map(|row| ColumnMetadata::from_raw(&raw_column(row), self.provider))
            .collect();
        Ok(TableMetadata::new(table, columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_column_from_row() {
        let row: ColumnRow = (
            "email".to_string(),
            2,
            "varchar(191)".to_string(),
            "NO".to_string(),
            None,
            String::new(),
            "UNI".to_string(),
            String::new(),
            Some("utf8mb4".to_string()),
            Some("utf8mb4_unicode_ci".to_string()),
            Some(String::new()),
        );
        let raw = raw_column(row);
        assert_eq!(raw.position, 2);
        assert!(!raw.nullable);
        assert_eq!(raw.generation_expression, None);

        let meta = ColumnMetadata::from_raw(&raw, DatabaseProvider::MySql);
        assert!(meta.is_unique);
        assert_eq!(
            meta.definition,
            "varchar(191) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL"
        );
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let never = std::future::pending::<std::result::Result<(), sqlx::Error>>();
        let result = with_timeout(Duration::from_millis(10), never).await;
        assert!(matches!(result, Err(SyncError::Timeout(0))));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_errors_through() {
        let failing = async { Err::<(), _>(sqlx::Error::RowNotFound) };
        let result = with_timeout(Duration::from_secs(1), failing).await;
        assert!(matches!(result, Err(SyncError::Database(_))));
    }
}
