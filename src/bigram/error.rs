//! Custom error types for the bigram-search crate.

use std::path::PathBuf;
use thiserror::Error;

use super::models::Record;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum BigramError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The input is not well-formed UTF-8.
    #[error("Invalid UTF-8 sequence at byte {offset}")]
    Decoding { offset: usize },

    /// The exact (first, second, docid, offset) tuple is already stored.
    #[error("Duplicate record: {0}")]
    DuplicateRecord(Record),

    /// An error reported by the SQLite backing store.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored row holds a value that cannot be mapped back to a record.
    #[error("Invalid value {value} in column '{column}'")]
    InvalidColumn { column: &'static str, value: i64 },

    /// An offset is too large for the store's integer column.
    #[error("Offset {0} does not fit into a signed 64-bit column")]
    OffsetOverflow(u64),

    /// A path that cannot be stored as text.
    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    /// A textual digest that is not 40 hex characters.
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),
}

/// A convenience `Result` type alias using the crate's `BigramError` type.
pub type Result<T> = std::result::Result<T, BigramError>;
