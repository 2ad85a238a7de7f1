//! Error types for Tessera core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Tessera core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Connection or statement failure, including engine errors.
    #[error("storage error: {0}")]
    Store(#[from] tessera_storage::StoreError),

    /// A value could not be rendered or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] tessera_codec::CodecError),

    /// A row did not carry a column the entity asked for.
    #[error("missing column {column} in {entity} row")]
    MissingColumn {
        /// Entity being decoded.
        entity: &'static str,
        /// Requested field key.
        column: &'static str,
    },

    /// An operation was issued on a store from inside one of its own operations.
    #[error("store is already in use by an operation on this thread")]
    ReentrantAccess,

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a missing column error.
    pub fn missing_column(entity: &'static str, column: &'static str) -> Self {
        Self::MissingColumn { entity, column }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns the engine result code when the failure came from the engine.
    #[must_use]
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Self::Store(err) => err.native_code(),
            _ => None,
        }
    }
}
