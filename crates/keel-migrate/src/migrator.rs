//! The migration engine.
//!
//! [`Migrator`] owns the database backend, the dialect adapter, the artifact
//! source, and the registry of discovered migrations. Construction bootstraps
//! the log table, discovers and pairs artifacts, and reconciles every
//! migration's status against the log exactly once. Afterwards status only
//! changes when an apply or revert transaction commits.

use crate::error::{MigrateError, MigrateResult};
use keel_core::{
    discover_migrations, ArtifactSource, CoreError, Direction, Migration, MigrationId,
    MigrationRegistry, MigrationStatus,
};
use keel_db::{Database, SqlParam};
use keel_sql::MigrationDialect;

/// Number of migrations per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    /// Applied migrations
    pub active: usize,
    /// Pending or reverted migrations
    pub inactive: usize,
}

impl StatusCounts {
    /// All discovered migrations
    pub fn total(&self) -> usize {
        self.active + self.inactive
    }
}

/// Applies and reverts migrations against one database connection.
pub struct Migrator {
    db: Box<dyn Database>,
    dialect: Box<dyn MigrationDialect>,
    source: Box<dyn ArtifactSource>,
    registry: MigrationRegistry,
}

impl Migrator {
    /// Bootstrap the log table, discover migrations, and load their status.
    pub fn new(
        db: Box<dyn Database>,
        dialect: Box<dyn MigrationDialect>,
        source: Box<dyn ArtifactSource>,
    ) -> MigrateResult<Self> {
        ensure_log_table(db.as_ref(), dialect.as_ref())?;

        log::debug!("Discovering migrations in {}", source.describe());
        let mut registry = discover_migrations(source.as_ref())?;

        let lookup = dialect.lookup_log_entry_statement();
        for id in registry.ids() {
            let logged = db
                .row_exists(&lookup, &SqlParam::Integer(id.as_i64()))
                .map_err(|source| MigrateError::StatusLookup { id, source })?;
            if logged {
                registry.set_status(id, MigrationStatus::Active);
            }
        }

        log::debug!(
            "Loaded {} migrations ({} active) from log table '{}'",
            registry.len(),
            registry.count(MigrationStatus::Active),
            dialect.log_table()
        );

        Ok(Self {
            db,
            dialect,
            source,
            registry,
        })
    }

    /// Migrations with `status` (all when `None`), strictly ascending by id.
    pub fn list_by_status(&self, status: Option<MigrationStatus>) -> Vec<Migration> {
        self.registry.list_by_status(status)
    }

    /// Every discovered migration, ascending by id.
    pub fn migrations(&self) -> Vec<Migration> {
        self.registry.list_by_status(None)
    }

    /// Snapshot of one migration.
    pub fn get(&self, id: MigrationId) -> Option<Migration> {
        self.registry.get(id).cloned()
    }

    /// How many discovered migrations are active and inactive.
    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts {
            active: self.registry.count(MigrationStatus::Active),
            inactive: self.registry.count(MigrationStatus::Inactive),
        }
    }

    /// Run a single migration in `direction`.
    ///
    /// The migration must exist and must not already be in the status the
    /// direction leads to.
    pub fn apply_migration(&mut self, id: MigrationId, direction: Direction) -> MigrateResult<()> {
        let migration = self
            .registry
            .get(id)
            .cloned()
            .ok_or(MigrateError::UnknownMigration(id))?;
        if migration.status == direction.target_status() {
            return Err(MigrateError::InvalidTransition {
                id,
                direction,
                status: migration.status,
            });
        }
        self.transition(&migration, direction)
    }

    /// Apply every inactive migration in ascending id order.
    ///
    /// Stops at the first failure; migrations committed before it stay applied.
    pub fn migrate(&mut self) -> MigrateResult<Vec<MigrationId>> {
        let pending = self.registry.list_by_status(Some(MigrationStatus::Inactive));
        if pending.is_empty() {
            log::info!("No pending migrations");
            return Ok(Vec::new());
        }

        let mut applied = Vec::with_capacity(pending.len());
        for migration in &pending {
            self.transition(migration, Direction::Up)?;
            applied.push(migration.id);
        }
        log::info!("Applied {} migration(s)", applied.len());
        Ok(applied)
    }

    /// Revert the highest-numbered active migration.
    pub fn rollback(&mut self) -> MigrateResult<Vec<MigrationId>> {
        self.rollback_n(1)
    }

    /// Revert the top `n` active migrations, highest id first.
    ///
    /// `n` is clamped to the number of active migrations; with none active
    /// this is a no-op.
    pub fn rollback_n(&mut self, n: usize) -> MigrateResult<Vec<MigrationId>> {
        let active = self.registry.list_by_status(Some(MigrationStatus::Active));
        if active.is_empty() {
            log::info!("No active migrations to roll back");
            return Ok(Vec::new());
        }

        let n = n.min(active.len());
        let mut reverted = Vec::with_capacity(n);
        for migration in active.iter().rev().take(n) {
            self.transition(migration, Direction::Down)?;
            reverted.push(migration.id);
        }
        log::info!("Rolled back {} migration(s)", reverted.len());
        Ok(reverted)
    }

    /// Revert every active migration, highest id first.
    pub fn rollback_all(&mut self) -> MigrateResult<Vec<MigrationId>> {
        let active = self.registry.count(MigrationStatus::Active);
        self.rollback_n(active)
    }

    /// Borrow the database backend.
    pub fn db(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Consume the engine and hand back the backend.
    pub fn into_database(self) -> Box<dyn Database> {
        self.db
    }

    /// Run one migration's script and log write in a single transaction.
    fn transition(&mut self, migration: &Migration, direction: Direction) -> MigrateResult<()> {
        let id = migration.id;
        let path = migration.location(direction).to_string();

        let bytes = self
            .source
            .read(&path)
            .map_err(|source| MigrateError::ArtifactRead { id, source })?;
        let script = String::from_utf8(bytes).map_err(|e| MigrateError::ArtifactRead {
            id,
            source: CoreError::ArtifactRead {
                locator: path.clone(),
                message: e.to_string(),
            },
        })?;
        let statements = self
            .dialect
            .split_statements(&script)
            .map_err(|source| MigrateError::Split {
                id,
                path: path.clone(),
                source,
            })?;

        match direction {
            Direction::Up => log::info!("Applying migration {} ({})", id, migration.name),
            Direction::Down => log::info!("Reverting migration {} ({})", id, migration.name),
        }

        self.db
            .begin()
            .map_err(|source| MigrateError::Begin { id, source })?;

        if let Err(err) = self.run_statements(id, &path, &statements, direction) {
            log::warn!("Migration {} failed, rolling back: {}", id, err);
            return Err(match self.db.rollback() {
                Ok(()) => err,
                Err(source) => MigrateError::TransactionRollback {
                    id,
                    source,
                    original: Box::new(err),
                },
            });
        }

        if let Err(source) = self.db.commit() {
            log::error!("Commit of migration {} failed: {}", id, source);
            if let Err(e) = self.db.rollback() {
                log::debug!("Rollback after failed commit: {}", e);
            }
            return Err(MigrateError::Commit { id, source });
        }

        self.registry.set_status(id, direction.target_status());
        log::debug!("Migration {} is now {}", id, direction.target_status());
        Ok(())
    }

    fn run_statements(
        &self,
        id: MigrationId,
        path: &str,
        statements: &[String],
        direction: Direction,
    ) -> MigrateResult<()> {
        log::debug!("Executing {} statement(s) from {}", statements.len(), path);
        for (i, sql) in statements.iter().enumerate() {
            self.db
                .execute(sql)
                .map_err(|source| MigrateError::Statement {
                    id,
                    path: path.to_string(),
                    index: i + 1,
                    source,
                })?;
        }

        let log_statement = match direction {
            Direction::Up => self.dialect.insert_log_entry_statement(),
            Direction::Down => self.dialect.delete_log_entry_statement(),
        };
        self.db
            .execute_with(&log_statement, &SqlParam::Integer(id.as_i64()))
            .map_err(|source| MigrateError::LogWrite { id, source })?;
        Ok(())
    }
}

/// Create the log table unless the probe finds it.
fn ensure_log_table(db: &dyn Database, dialect: &dyn MigrationDialect) -> MigrateResult<()> {
    let table = dialect.log_table();
    let bootstrap_error = |source| MigrateError::Bootstrap {
        table: table.to_string(),
        source,
    };

    let exists = db
        .row_exists(
            &dialect.probe_log_table_statement(),
            &SqlParam::Text(table.to_string()),
        )
        .map_err(bootstrap_error)?;
    if exists {
        return Ok(());
    }

    log::info!("Creating migration log table '{}'", table);
    db.execute(&dialect.create_log_table_statement())
        .map_err(bootstrap_error)?;
    Ok(())
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
