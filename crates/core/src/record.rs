//! Stored record and query types
//!
//! [`EventRecord`] is what a backing store persists; [`RecordFilter`] is the
//! query shape the reader sends per shard; [`EventInfo`] is what the reader
//! hands back to the host.

use crate::types::{RecordId, StreamKey, Version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A durable log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord<K> {
    /// Record id, unique across the log
    pub record_id: RecordId,
    /// Owning stream
    pub stream_id: K,
    /// Version within the stream
    pub version: Version,
    /// Event shape tag, used to pick the decoder
    pub type_code: String,
    /// Encoded event body
    pub payload: Vec<u8>,
    /// Deduplication key, unique across the log
    pub message_id: String,
    /// Set once downstream effects have been applied
    pub is_complete: bool,
    /// Event time; selected the shard at write time
    pub timestamp: DateTime<Utc>,
}

/// Per-shard query
///
/// Matches records of one stream with `version > after_version`, optionally
/// restricted to `version <= up_to_version` and to one exact type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter<K> {
    /// Stream to match
    pub stream_id: K,
    /// Exclusive lower version bound
    pub after_version: Version,
    /// Inclusive upper version bound, if any
    pub up_to_version: Option<Version>,
    /// Exact type code, if any
    pub type_code: Option<String>,
}

impl<K: StreamKey> RecordFilter<K> {
    /// Filter for `after_version < version <= up_to_version`
    pub fn version_range(stream_id: K, after_version: Version, up_to_version: Version) -> Self {
        Self {
            stream_id,
            after_version,
            up_to_version: Some(up_to_version),
            type_code: None,
        }
    }

    /// Filter for one type code with `version > after_version`, no upper bound
    pub fn of_type(stream_id: K, type_code: impl Into<String>, after_version: Version) -> Self {
        Self {
            stream_id,
            after_version,
            up_to_version: None,
            type_code: Some(type_code.into()),
        }
    }

    /// Returns true if the record satisfies every bound of this filter
    pub fn matches(&self, record: &EventRecord<K>) -> bool {
        if record.stream_id != self.stream_id || record.version <= self.after_version {
            return false;
        }
        if let Some(upper) = self.up_to_version {
            if record.version > upper {
                return false;
            }
        }
        match &self.type_code {
            Some(code) => record.type_code == *code,
            None => true,
        }
    }
}

/// A decoded event together with its completion flag
#[derive(Debug, Clone, PartialEq)]
pub struct EventInfo<E> {
    /// The decoded event
    pub event: E,
    /// Whether downstream effects were marked applied
    pub is_complete: bool,
}

/// Read result, ascending by version
pub type EventList<E> = Vec<EventInfo<E>>;
