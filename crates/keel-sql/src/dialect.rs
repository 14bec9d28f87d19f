//! Migration dialect adapters
//!
//! An adapter knows the SQL for managing the migration log table in one
//! database dialect and how to split a script into statements. Adapters are
//! pure string producers; they never talk to a database.

use keel_core::config::DEFAULT_LOG_TABLE;
use keel_core::DbType;
use sqlparser::dialect::{
    Dialect, DuckDbDialect as SqlParserDuckDb, SQLiteDialect as SqlParserSqlite,
};

use crate::error::SqlResult;
use crate::splitter;

/// Column holding the migration id in the log table
pub const LOG_ID_COLUMN: &str = "migration_id";

/// Trait for migration dialect implementations
///
/// Statements with parameters use a single positional `?` placeholder:
/// the table name for the probe, the migration id for the log entry
/// statements.
pub trait MigrationDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Get the underlying sqlparser dialect
    fn parser_dialect(&self) -> &dyn Dialect;

    /// Unquoted name of the migration log table
    fn log_table(&self) -> &str;

    /// Quote an identifier for this dialect
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Statement creating the log table
    fn create_log_table_statement(&self) -> String;

    /// Query returning one row when the log table exists (`?` = table name)
    fn probe_log_table_statement(&self) -> String;

    /// Query returning one row when a migration id is logged (`?` = id)
    fn lookup_log_entry_statement(&self) -> String {
        format!(
            "SELECT {LOG_ID_COLUMN} FROM {} WHERE {LOG_ID_COLUMN} = ?",
            self.quote_ident(self.log_table())
        )
    }

    /// Statement recording a migration as applied (`?` = id)
    fn insert_log_entry_statement(&self) -> String {
        format!(
            "INSERT INTO {} ({LOG_ID_COLUMN}) VALUES (?)",
            self.quote_ident(self.log_table())
        )
    }

    /// Statement removing a migration's log entry (`?` = id)
    fn delete_log_entry_statement(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {LOG_ID_COLUMN} = ?",
            self.quote_ident(self.log_table())
        )
    }

    /// Split a raw script into individually executable statements
    fn split_statements(&self, script: &str) -> SqlResult<Vec<String>> {
        splitter::split_statements(self.parser_dialect(), script)
    }
}

/// DuckDB migration dialect
pub struct DuckDbDialect {
    dialect: SqlParserDuckDb,
    log_table: String,
}

impl DuckDbDialect {
    /// Create a DuckDB dialect logging into `log_table`
    pub fn new(log_table: impl Into<String>) -> Self {
        Self {
            dialect: SqlParserDuckDb {},
            log_table: log_table.into(),
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TABLE)
    }
}

impl MigrationDialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn log_table(&self) -> &str {
        &self.log_table
    }

    fn create_log_table_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             {LOG_ID_COLUMN} BIGINT PRIMARY KEY, \
             applied_at TIMESTAMP NOT NULL DEFAULT current_timestamp)",
            self.quote_ident(&self.log_table)
        )
    }

    fn probe_log_table_statement(&self) -> String {
        "SELECT table_name FROM information_schema.tables \
         WHERE table_schema = 'main' AND table_name = ?"
            .to_string()
    }
}

/// SQLite migration dialect
pub struct SqliteDialect {
    dialect: SqlParserSqlite,
    log_table: String,
}

impl SqliteDialect {
    /// Create a SQLite dialect logging into `log_table`
    pub fn new(log_table: impl Into<String>) -> Self {
        Self {
            dialect: SqlParserSqlite {},
            log_table: log_table.into(),
        }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TABLE)
    }
}

impl MigrationDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn parser_dialect(&self) -> &dyn Dialect {
        &self.dialect
    }

    fn log_table(&self) -> &str {
        &self.log_table
    }

    fn create_log_table_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             {LOG_ID_COLUMN} INTEGER PRIMARY KEY, \
             applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP)",
            self.quote_ident(&self.log_table)
        )
    }

    fn probe_log_table_statement(&self) -> String {
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?".to_string()
    }
}

/// Create the dialect adapter matching a configured database type
pub fn dialect_for(db_type: DbType, log_table: &str) -> Box<dyn MigrationDialect> {
    match db_type {
        DbType::DuckDb => Box::new(DuckDbDialect::new(log_table)),
        DbType::Sqlite => Box::new(SqliteDialect::new(log_table)),
    }
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
