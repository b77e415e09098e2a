//! Error types for sqlite-vec-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid table name: {0}")]
    TableName(String),

    #[error("table '{0}' does not exist; call create_table() first")]
    TableNotFound(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("connection pool exhausted after {waited_ms}ms (max={max})")]
    PoolExhausted { max: usize, waited_ms: u64 },

    #[error("invalid embedding blob: {0}")]
    Decode(String),

    #[error(
        "table '{table}' already exists with dim={existing_dim}, \
         distance={existing_distance}; requested dim={requested_dim}, \
         distance={requested_distance}"
    )]
    SchemaMismatch {
        table: String,
        existing_dim: usize,
        existing_distance: String,
        requested_dim: usize,
        requested_distance: String,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Map a rusqlite failure onto `TableNotFound` when the engine reports a
    /// missing table; everything else passes through as `Sqlite`.
    pub(crate) fn from_sqlite(err: rusqlite::Error, table: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(_, Some(msg)) = &err {
            if msg.to_lowercase().contains("no such table") {
                return Error::TableNotFound(table.to_string());
            }
        }
        Error::Sqlite(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
