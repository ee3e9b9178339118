//! Core error type.
//!
//! Configuration problems are the only recoverable failures in this
//! workspace, and they all surface here or in `tm-sim`'s `SimError` at
//! construction time.  Nothing is partially initialized on error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing parameter '{0}'")]
    MissingParameter(String),

    #[error("parameter '{key}': cannot parse {value:?} as {expected}")]
    Parse {
        key:      String,
        value:    String,
        expected: &'static str,
    },

    #[error("invalid parameter line {line}: {text:?}")]
    Syntax { line: usize, text: String },

    #[error("invalid distribution parameter: {0}")]
    Distribution(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tm-core`.
pub type CoreResult<T> = Result<T, CoreError>;
