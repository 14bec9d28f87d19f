//! Configuration types and parsing for keel.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from keel.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory containing migration scripts, relative to the project root
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Name of the table recording applied migration ids
    #[serde(default = "default_log_table")]
    pub log_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            migrations_path: default_migrations_path(),
            log_table: default_log_table(),
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
    /// SQLite
    Sqlite,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
            DbType::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type (duckdb or sqlite)
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

/// Default name of the migration log table
pub const DEFAULT_LOG_TABLE: &str = "keel_migrations";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_log_table() -> String {
    DEFAULT_LOG_TABLE.to_string()
}

/// Whether `name` can be used unquoted as a table name in every supported dialect.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for keel.yml or keel.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("keel.yml");
        let yaml_path = dir.join("keel.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }

        if !is_plain_identifier(&self.log_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "log_table '{}' must start with a letter or underscore and contain only letters, digits, and underscores",
                    self.log_table
                ),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the absolute migrations directory relative to a project root
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Get the database path, resolving relative file paths against a project root
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == DEFAULT_DB_PATH || Path::new(&self.database.path).is_absolute() {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
