//! Error types for shardlog
//!
//! Three layers:
//! - [`StoreError`]: what a backing store reports. `DuplicateKey` is the one
//!   outcome the writer recovers from locally.
//! - [`CodecError`]: what the codec gateway reports.
//! - [`Error`]: what the engine surfaces to the host.

use crate::types::Version;
use thiserror::Error;

/// Unique index of the backing store that rejected an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniqueIndex {
    /// Primary key (`record_id`)
    RecordId,
    /// Log-wide uniqueness of `message_id`
    MessageId,
    /// Uniqueness of `(stream_id, version)`
    StreamVersion,
}

impl std::fmt::Display for UniqueIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueIndex::RecordId => f.write_str("record_id"),
            UniqueIndex::MessageId => f.write_str("message_id"),
            UniqueIndex::StreamVersion => f.write_str("stream_version"),
        }
    }
}

/// Errors reported by a backing store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Insert rejected by a unique index
    #[error("duplicate key on {index} index: {key}")]
    DuplicateKey {
        /// Index that rejected the insert
        index: UniqueIndex,
        /// Offending key, rendered for diagnostics
        key: String,
    },

    /// Update target does not exist
    #[error("record {record_id} not found in shard {shard}")]
    NotFound {
        /// Qualified shard name
        shard: String,
        /// Record that was looked up
        record_id: String,
    },

    /// Any other backend failure (I/O, connection, server error)
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Check if this is a unique-index violation
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}

/// Result type for backing store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors reported by the codec gateway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// No decoder/encoder registered for the type code
    #[error("unknown event type code: {0}")]
    UnknownType(String),

    /// Event does not have the shape registered for its own type code
    #[error("event does not match the shape registered for type code {0}")]
    ShapeMismatch(String),

    /// Payload could not be encoded
    #[error("failed to encode {type_code}: {message}")]
    Encode {
        /// Type code of the event
        type_code: String,
        /// Underlying serializer message
        message: String,
    },

    /// Payload could not be decoded
    #[error("failed to decode {type_code}: {message}")]
    Decode {
        /// Type code used for decoding
        type_code: String,
        /// Underlying deserializer message
        message: String,
    },
}

/// All shardlog errors.
///
/// Every failure except a duplicate append is surfaced verbatim so the host
/// runtime can apply its own retry policy.
#[derive(Debug, Error)]
pub enum Error {
    /// A store call did not complete within the configured deadline
    #[error("storage timeout: {operation} on shard {shard} exceeded {timeout_ms}ms")]
    StorageTimeout {
        /// Operation that timed out (`find`, `insert`, `set_complete`)
        operation: &'static str,
        /// Qualified shard name
        shard: String,
        /// Configured deadline
        timeout_ms: u64,
    },

    /// Backing store failure
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Payload could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Event version does not follow the expected stream version
    #[error("version conflict on stream {stream}: expected {expected}, got {actual}")]
    VersionConflict {
        /// Stream key, rendered for diagnostics
        stream: String,
        /// Version the caller expected to write
        expected: Version,
        /// Version the event carried
        actual: Version,
    },

    /// Optimistic append hit a version the stream already holds
    #[error("version {version} of stream {stream} is already taken")]
    VersionTaken {
        /// Stream key, rendered for diagnostics
        stream: String,
        /// Version the append tried to write
        version: Version,
    },

    /// Invalid argument from the caller
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or unloadable configuration
    #[error("invalid config: {0}")]
    Config(String),
}

/// Result type for shardlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::StorageTimeout { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Storage(StoreError::NotFound { .. }))
    }

    /// Check if this is a conflict error.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::VersionConflict { .. } | Error::VersionTaken { .. }
        )
    }

    /// Check if this error is retryable.
    ///
    /// Timeouts and backend failures may succeed on retry; conflicts need the
    /// caller to reload the stream first, and codec errors never heal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::StorageTimeout { .. } | Error::Storage(StoreError::Backend(_))
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
