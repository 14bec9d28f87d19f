//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use keel_core::{Config, DbType, DirectorySource, MigrationId};
use keel_db::{Database, DuckDbBackend, SqliteBackend};
use keel_migrate::Migrator;
use keel_sql::dialect_for;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// A project directory and its loaded configuration.
#[derive(Debug)]
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }
}

/// Load `keel.yml` from the project directory or the `--config` override.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::load_from_dir(&root)
            .with_context(|| format!("Failed to load config in {}", root.display()))?,
    };
    Ok(Project { root, config })
}

/// Open the configured database backend.
pub(crate) fn open_database(project: &Project) -> Result<Box<dyn Database>> {
    let path = project.config.database_path_absolute(&project.root);
    let db: Box<dyn Database> = match project.config.database.db_type {
        DbType::DuckDb => Box::new(
            DuckDbBackend::new(&path)
                .with_context(|| format!("Failed to open DuckDB database at {}", path))?,
        ),
        DbType::Sqlite => Box::new(
            SqliteBackend::new(&path)
                .with_context(|| format!("Failed to open SQLite database at {}", path))?,
        ),
    };
    log::debug!("Opened {} database at {}", db.db_type(), path);
    Ok(db)
}

/// Build a migrator over the project's database and migrations directory.
pub(crate) fn open_migrator(project: &Project) -> Result<Migrator> {
    let db = open_database(project)?;
    let dialect = dialect_for(project.config.database.db_type, &project.config.log_table);
    let source = DirectorySource::new(project.migrations_dir());
    Migrator::new(db, dialect, Box::new(source)).context("Failed to initialize migrator")
}

/// Convert a raw `--only` value into a migration id.
pub(crate) fn parse_migration_id(raw: u64) -> Result<MigrationId> {
    MigrationId::new(raw).with_context(|| format!("Invalid migration id: {}", raw))
}

/// Render a list of ids as `1, 2, 3`.
pub(crate) fn join_ids(ids: &[MigrationId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
