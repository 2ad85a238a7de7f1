//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur at the connection/statement layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database engine returned a failure status.
    #[error("sqlite error {code}: {message}")]
    Native {
        /// Extended engine result code.
        code: i32,
        /// Engine message.
        message: String,
    },

    /// The binding layer rejected a call before it reached the engine.
    #[error("driver error: {message}")]
    Driver {
        /// Description of the failure.
        message: String,
    },

    /// A column value could not be converted.
    #[error("codec error: {0}")]
    Codec(#[from] tessera_codec::CodecError),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    /// Creates a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Returns the engine result code, if this error came from the engine.
    #[must_use]
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::SqliteFailure(err, message) => Self::Native {
                code: err.extended_code,
                message: message.unwrap_or_else(|| err.to_string()),
            },
            other => Self::driver(other.to_string()),
        }
    }
}
