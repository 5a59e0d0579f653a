//! Error types for record preparation.

use dataimport_types::Key;
use thiserror::Error;

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while preparing or reading a record payload.
///
/// Cloneable because the outcome of preparation is memoized on the record
/// and handed out again on every later access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The serialized payload could not be decoded.
    #[error("payload of {key} could not be decoded: {message}")]
    Decode { key: Key, message: String },

    /// The record carries neither serialized bytes nor prepared data.
    #[error("record {0} has no payload")]
    MissingPayload(Key),

    /// The decoder panicked while preparing the payload.
    #[error("decoder panicked on {key}: {message}")]
    Panicked { key: Key, message: String },

    /// Prepared data was requested before `ensure_deserialized` succeeded.
    #[error("record {0} has not been deserialized")]
    NotPrepared(Key),

    /// The prepared payload does not have the shape the reader expected.
    #[error("payload of {key} has unexpected shape: {message}")]
    Shape { key: Key, message: String },
}

impl RecordError {
    /// Key of the record the error belongs to.
    pub fn key(&self) -> &Key {
        match self {
            RecordError::Decode { key, .. }
            | RecordError::Panicked { key, .. }
            | RecordError::Shape { key, .. }
            | RecordError::MissingPayload(key)
            | RecordError::NotPrepared(key) => key,
        }
    }
}
