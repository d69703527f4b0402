//! Error types for balance-core
//!
//! Only batch-fatal conditions live here. Row-scoped problems are
//! collected in an [`crate::report::ImportReport`] and never abort a batch.

use crate::schema::TableKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors: the batch aborts before any record is written
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV header row could not be read
    #[error("CSV error in '{source_name}': {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// The file has no header columns at all
    #[error("no columns found in '{source_name}'")]
    EmptyTable { source_name: String },

    /// A required column is missing from the header row
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn { table: TableKind, column: String },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
