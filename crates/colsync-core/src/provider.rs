//! Supported database providers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Provider identifiers accepted in the schema's `datasource` block.
pub const SUPPORTED_PROVIDERS: &[&str] = &["mysql", "mariadb"];

/// A database that supports in-place column repositioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    /// MySQL 5.7+.
    MySql,
    /// MariaDB 10.2+.
    MariaDb,
}

impl DatabaseProvider {
    /// Parses a provider identifier, refusing anything outside
    /// [`SUPPORTED_PROVIDERS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedProvider`] naming the provider and the
    /// supported set.
    pub fn parse(provider: &str) -> Result<Self> {
        match provider.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySql),
            "mariadb" => Ok(Self::MariaDb),
            _ => Err(Error::UnsupportedProvider {
                provider: provider.to_string(),
                supported: SUPPORTED_PROVIDERS.join(", "),
            }),
        }
    }

    /// Returns the provider identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
        }
    }

    /// Detects the server flavour from a `SELECT VERSION()` string.
    #[must_use]
    pub fn from_server_version(version: &str) -> Self {
        if version.to_ascii_lowercase().contains("mariadb") {
            Self::MariaDb
        } else {
            Self::MySql
        }
    }
}

impl std::fmt::Display for DatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
