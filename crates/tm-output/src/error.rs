//! Error types for tm-output.

use thiserror::Error;
use tm_sim::SimError;

/// Errors that can occur when writing model output or reading a snapshot.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A snapshot file parsed but does not describe a valid network.
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SimError),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
