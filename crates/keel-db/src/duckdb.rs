//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, SqlParam};
use duckdb::Connection;
use std::path::Path;

/// DuckDB database backend
///
/// Single-threaded: the engine drives one connection from one caller, so
/// the connection is owned directly without a `Mutex`.
pub struct DuckDbBackend {
    conn: Connection,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn transaction_control(&self, operation: &str) -> DbResult<()> {
        self.conn
            .execute_batch(operation)
            .map_err(|e| DbError::TransactionError {
                operation: operation.to_string(),
                message: e.to_string(),
            })
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        self.conn
            .execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_with(&self, sql: &str, param: &SqlParam) -> DbResult<usize> {
        let result = match param {
            SqlParam::Text(s) => self.conn.execute(sql, duckdb::params![s]),
            SqlParam::Integer(i) => self.conn.execute(sql, duckdb::params![i]),
        };
        result.map_err(|e| DbError::ExecutionError(format!("{}: {} [{}]", e, sql, param)))
    }

    fn row_exists(&self, sql: &str, param: &SqlParam) -> DbResult<bool> {
        let result = match param {
            SqlParam::Text(s) => self.conn.query_row(sql, duckdb::params![s], |_| Ok(())),
            SqlParam::Integer(i) => self.conn.query_row(sql, duckdb::params![i], |_| Ok(())),
        };
        match result {
            Ok(()) => Ok(true),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(DbError::ExecutionError(format!(
                "{}: {} [{}]",
                e, sql, param
            ))),
        }
    }

    fn begin(&self) -> DbResult<()> {
        self.transaction_control("BEGIN TRANSACTION")
    }

    fn commit(&self) -> DbResult<()> {
        self.transaction_control("COMMIT")
    }

    fn rollback(&self) -> DbResult<()> {
        self.transaction_control("ROLLBACK")
    }

    fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
