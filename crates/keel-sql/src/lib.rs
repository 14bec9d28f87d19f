//! keel-sql - SQL dialect layer for Keel
//!
//! This crate provides the [`MigrationDialect`] adapters (DuckDB, SQLite)
//! that produce the log-table statements the migration engine runs, and a
//! tokenizer-based splitter that cuts migration scripts into statements.

pub mod dialect;
pub mod error;
pub mod splitter;

pub use dialect::{dialect_for, DuckDbDialect, MigrationDialect, SqliteDialect, LOG_ID_COLUMN};
pub use error::{SqlError, SqlResult};
pub use splitter::split_statements;
