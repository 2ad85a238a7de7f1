//! Error types for the codec crate.

use crate::value::ScalarKind;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while converting between scalars and stored values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Blob values cannot be embedded in query text.
    #[error("blob values cannot be rendered as query literals")]
    BlobLiteral,

    /// NaN and infinities have no literal form.
    #[error("non-finite real values cannot be rendered as query literals")]
    NonFiniteReal,

    /// The stored value does not satisfy the requested scalar kind.
    #[error("kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: ScalarKind,
        /// What the column actually held.
        found: &'static str,
    },

    /// Text column held bytes that are not UTF-8.
    #[error("invalid UTF-8 in text column")]
    InvalidUtf8,

    /// Stored seconds are outside the representable timestamp range.
    #[error("timestamp out of range: {seconds}")]
    InvalidTimestamp {
        /// The raw stored value.
        seconds: String,
    },

    /// Stored text is not a valid URL.
    #[error("invalid URL {text:?}: {message}")]
    InvalidUrl {
        /// The raw stored text.
        text: String,
        /// Parser message.
        message: String,
    },
}

impl CodecError {
    /// Create a kind mismatch error.
    pub fn kind_mismatch(expected: ScalarKind, found: &'static str) -> Self {
        Self::KindMismatch { expected, found }
    }

    /// Create an invalid timestamp error.
    pub fn invalid_timestamp(seconds: f64) -> Self {
        Self::InvalidTimestamp {
            seconds: seconds.to_string(),
        }
    }
}
