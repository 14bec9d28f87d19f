//! Error types for keel-sql

use thiserror::Error;

/// SQL dialect and script errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Script could not be tokenized (S001)
    #[error("[S001] SQL tokenize error at line {line}, column {column}: {message}")]
    TokenizeError {
        message: String,
        line: u64,
        column: u64,
    },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
