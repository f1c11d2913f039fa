//! # Domain Errors
//!
//! Error types for the record store.
//!
//! - `StoreError` is the only error surfaced by the inbound API.
//! - `WorldStateError` and `SerializationError` are raised by the outbound
//!   ports and converted into `StoreError` with `From`.
//!
//! The store never retries and never recovers locally. Every error reaches the
//! caller as-is.

use thiserror::Error;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `create` called with an id that is already present.
    #[error("the transaction {id} already exists")]
    AlreadyExists { id: String },

    /// `read`/`update`/`delete` called with an id that is absent.
    #[error("the transaction {id} does not exist")]
    NotFound { id: String },

    /// Stored bytes do not decode to the record schema, or a record could not
    /// be encoded.
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// The world state failed (I/O, corruption, unavailable).
    #[error("failed to access world state: {message}")]
    LedgerAccess { message: String },

    /// A key or key part cannot be encoded in the world state.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
}

/// Stable category of a `StoreError`, for callers that dispatch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    Serialization,
    LedgerAccess,
    InvalidKey,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AlreadyExists => "AlreadyExists",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Serialization => "Serialization",
            ErrorKind::LedgerAccess => "LedgerAccess",
            ErrorKind::InvalidKey => "InvalidKey",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::Serialization { .. } => ErrorKind::Serialization,
            StoreError::LedgerAccess { .. } => ErrorKind::LedgerAccess,
            StoreError::InvalidKey { .. } => ErrorKind::InvalidKey,
        }
    }
}

/// World state port errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldStateError {
    /// I/O error during read/write.
    #[error("world state I/O error: {message}")]
    Io { message: String },

    /// Persisted state failed its integrity check.
    #[error("world state corruption: {message}")]
    Corruption { message: String },

    /// The backing ledger cannot be reached.
    #[error("world state unavailable")]
    Unavailable,

    /// Another process holds the data directory.
    #[error("world state locked: {message}")]
    Locked { message: String },

    /// Key rejected before reaching the backing store.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },
}

impl From<WorldStateError> for StoreError {
    fn from(err: WorldStateError) -> Self {
        match err {
            WorldStateError::InvalidKey { reason } => StoreError::InvalidKey { reason },
            other => StoreError::LedgerAccess {
                message: other.to_string(),
            },
        }
    }
}

/// Record encoding/decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Serialization error: {message}")]
pub struct SerializationError {
    pub message: String,
}

impl From<SerializationError> for StoreError {
    fn from(err: SerializationError) -> Self {
        StoreError::Serialization {
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::AlreadyExists { id: "7".into() };
        assert_eq!(err.to_string(), "the transaction 7 already exists");

        let err = StoreError::NotFound { id: "7".into() };
        assert_eq!(err.to_string(), "the transaction 7 does not exist");
    }

    #[test]
    fn test_world_state_error_conversion() {
        let ws_err = WorldStateError::Io {
            message: "disk failure".to_string(),
        };
        let store_err: StoreError = ws_err.into();

        match store_err {
            StoreError::LedgerAccess { message } => {
                assert!(message.contains("disk failure"));
            }
            _ => panic!("Expected LedgerAccess"),
        }
    }

    #[test]
    fn test_invalid_key_keeps_its_kind() {
        let store_err: StoreError = WorldStateError::InvalidKey {
            reason: "empty".into(),
        }
        .into();
        assert_eq!(store_err.kind(), ErrorKind::InvalidKey);
    }
}
