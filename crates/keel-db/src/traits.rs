//! Database trait definition

use crate::error::DbResult;
use std::fmt;

/// A single positional parameter bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Text value (table names)
    Text(String),
    /// Integer value (migration ids)
    Integer(i64),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Text(s) => write!(f, "'{s}'"),
            SqlParam::Integer(i) => write!(f, "{i}"),
        }
    }
}

/// Blocking database abstraction used by the migration engine
///
/// Every call blocks until the database answers. Transactions are explicit:
/// statements between [`begin`](Database::begin) and
/// [`commit`](Database::commit) / [`rollback`](Database::rollback) run on
/// the same connection inside one transaction.
pub trait Database: Send {
    /// Execute a single statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute a single statement with one bound parameter
    fn execute_with(&self, sql: &str, param: &SqlParam) -> DbResult<usize>;

    /// Run a query with one bound parameter; `Ok(false)` when it returns no rows
    fn row_exists(&self, sql: &str, param: &SqlParam) -> DbResult<bool>;

    /// Open a transaction
    fn begin(&self) -> DbResult<()>;

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()>;

    /// Number of rows `sql` returns
    fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
