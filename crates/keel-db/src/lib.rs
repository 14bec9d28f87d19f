//! keel-db - Database abstraction layer for Keel
//!
//! This crate provides the blocking `Database` trait the migration engine
//! runs against, with DuckDB and SQLite implementations.

pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use sqlite::SqliteBackend;
pub use traits::{Database, SqlParam};
