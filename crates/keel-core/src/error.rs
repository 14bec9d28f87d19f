//! Error types for keel-core

use thiserror::Error;

/// Core error type for Keel
#[derive(Error, Debug)]
pub enum CoreError {
    /// K001: Configuration file not found
    #[error("[K001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// K002: Invalid configuration value
    #[error("[K002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// K003: Migration location is not a directory
    #[error("[K003] Migrations location is not a directory: {location}")]
    SourceNotFound { location: String },

    /// K004: Migration location could not be enumerated
    #[error("[K004] Failed to list migrations in '{location}': {message}")]
    SourceListFailed { location: String, message: String },

    /// K005: Migration artifact could not be read
    #[error("[K005] Failed to read migration artifact '{locator}': {message}")]
    ArtifactRead { locator: String, message: String },

    /// K006: Migration id is missing its up or down half (or is otherwise invalid)
    #[error("[K006] Invalid pair of migration files for id {id}: {path}")]
    InvalidMigrationPair { id: u64, path: String },

    /// K007: Two artifacts claim the same id and direction
    #[error("[K007] Duplicate {direction} migration for id {id}: '{first}' and '{second}'")]
    DuplicateMigration {
        id: u64,
        direction: String,
        first: String,
        second: String,
    },

    /// K008: Direction token is neither `up` nor `down`
    #[error("[K008] Invalid migration direction '{0}': expected 'up' or 'down'")]
    InvalidDirection(String),

    /// K009: IO error with file path context
    #[error("[K009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// K010: Config YAML parse error
    #[error("[K010] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
