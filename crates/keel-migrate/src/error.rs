//! Error types for the migration engine.

use keel_core::{CoreError, Direction, MigrationId, MigrationStatus};
use keel_db::DbError;
use keel_sql::SqlError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Log table could not be probed or created (M001).
    #[error("[M001] Failed to bootstrap migration log table '{table}': {source}")]
    Bootstrap {
        table: String,
        #[source]
        source: DbError,
    },

    /// Discovery or pairing of migration artifacts failed (M002).
    #[error("[M002] Migration discovery failed: {0}")]
    Discovery(#[from] CoreError),

    /// Log lookup for a discovered migration failed during startup (M003).
    #[error("[M003] Failed to look up log entry for migration {id}: {source}")]
    StatusLookup {
        id: MigrationId,
        #[source]
        source: DbError,
    },

    /// No migration with this id was discovered (M004).
    #[error("[M004] Unknown migration id {0}")]
    UnknownMigration(MigrationId),

    /// Migration is already in the status the direction would produce (M005).
    #[error("[M005] Cannot apply {direction} to migration {id}: it is already {status}")]
    InvalidTransition {
        id: MigrationId,
        direction: Direction,
        status: MigrationStatus,
    },

    /// Script could not be read from the artifact source (M006).
    #[error("[M006] Failed to read script for migration {id}: {source}")]
    ArtifactRead {
        id: MigrationId,
        #[source]
        source: CoreError,
    },

    /// Script could not be split into statements (M007).
    #[error("[M007] Failed to split script for migration {id} ({path}): {source}")]
    Split {
        id: MigrationId,
        path: String,
        #[source]
        source: SqlError,
    },

    /// Transaction could not be opened (M008).
    #[error("[M008] Failed to begin transaction for migration {id}: {source}")]
    Begin {
        id: MigrationId,
        #[source]
        source: DbError,
    },

    /// A statement of the script failed; `index` is 1-based (M009).
    #[error("[M009] Statement {index} of migration {id} ({path}) failed: {source}")]
    Statement {
        id: MigrationId,
        path: String,
        index: usize,
        #[source]
        source: DbError,
    },

    /// Log table insert or delete failed (M010).
    #[error("[M010] Failed to update log entry for migration {id}: {source}")]
    LogWrite {
        id: MigrationId,
        #[source]
        source: DbError,
    },

    /// Rolling back a failed transaction also failed (M011).
    #[error("[M011] Rollback of migration {id} failed: {source} (after: {original})")]
    TransactionRollback {
        id: MigrationId,
        #[source]
        source: DbError,
        original: Box<MigrateError>,
    },

    /// Commit failed; whether the migration took effect is unknown (M012).
    #[error("[M012] Commit of migration {id} failed, database state is unknown: {source}")]
    Commit {
        id: MigrationId,
        #[source]
        source: DbError,
    },
}

impl MigrateError {
    /// Whether the failed operation left the database in a known state.
    ///
    /// After a commit failure the log table must be re-read before retrying.
    pub fn is_retry_safe(&self) -> bool {
        !matches!(
            self,
            MigrateError::Commit { .. } | MigrateError::Bootstrap { .. }
        )
    }

    /// Migration the error is about, when there is one.
    pub fn migration_id(&self) -> Option<MigrationId> {
        match self {
            MigrateError::Bootstrap { .. } | MigrateError::Discovery(_) => None,
            MigrateError::StatusLookup { id, .. }
            | MigrateError::InvalidTransition { id, .. }
            | MigrateError::ArtifactRead { id, .. }
            | MigrateError::Split { id, .. }
            | MigrateError::Begin { id, .. }
            | MigrateError::Statement { id, .. }
            | MigrateError::LogWrite { id, .. }
            | MigrateError::TransactionRollback { id, .. }
            | MigrateError::Commit { id, .. } => Some(*id),
            MigrateError::UnknownMigration(id) => Some(*id),
        }
    }
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
