//! Identity types for the event journal
//!
//! This module defines the fundamental types used throughout the system:
//! - [`RecordId`]: Unique identifier of a stored log record
//! - [`Version`]: Per-stream event version
//! - [`StreamKey`]: Bound for the key of an event stream
//! - [`LogEvent`]: What the engine reads off a host event
//! - [`EventMeta`]: Embeddable metadata block implementing the common accessors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use uuid::Uuid;

/// Per-stream event version.
///
/// Versions are assigned by the host before an event reaches the journal and
/// are strictly increasing within a stream.
pub type Version = u32;

/// Key of an event stream (the entity whose history is journaled).
///
/// The journal never interprets a key beyond equality and hashing, so any
/// owned, comparable type works: `String`, `Uuid`, `u64`, or a host newtype.
pub trait StreamKey: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StreamKey for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Unique identifier of a log record
///
/// RecordId is globally unique within a log. Hosts may bring their own ids
/// (any non-empty string); when they don't, the writer mints one with
/// [`RecordId::generate`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a RecordId from an existing identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use shardlog_core::RecordId;
    ///
    /// let id = RecordId::new("evt-42");
    /// assert_eq!(id.as_str(), "evt-42");
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    /// Mint a new random RecordId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use shardlog_core::RecordId;
    ///
    /// let id1 = RecordId::generate();
    /// let id2 = RecordId::generate();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn generate() -> Self {
        RecordId(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (treated as "no id" by the writer)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

/// An event as seen by the journal
///
/// The journal does not own the event type. It only needs these accessors to
/// build a record on write, to pick a shard, and to order decoded events on
/// read. Decoded events must report the same version they were written with.
pub trait LogEvent: Send + Sync + 'static {
    /// Key of the stream this event belongs to
    type Key: StreamKey;

    /// The owning stream
    fn stream_id(&self) -> &Self::Key;

    /// Version of the event within its stream
    fn version(&self) -> Version;

    /// Tag identifying the concrete event shape
    fn type_code(&self) -> &str;

    /// Identifier of the log record, if one was already assigned
    fn record_id(&self) -> Option<&RecordId>;

    /// Wall-clock time of the event; selects the shard
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Metadata block hosts can embed in their event types
///
/// Serializes with the event body, so decoded events carry their version and
/// record id back to the reader.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use shardlog_core::EventMeta;
///
/// let meta = EventMeta::new("account-1".to_string(), 1, Utc::now());
/// assert!(meta.record_id.is_none());
/// assert_eq!(meta.version, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta<K> {
    /// Record id, `None` until the event has been stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    /// Owning stream
    pub stream_id: K,
    /// Version within the stream
    pub version: Version,
    /// Event time
    pub timestamp: DateTime<Utc>,
}

impl<K> EventMeta<K> {
    /// Create metadata without a record id
    pub fn new(stream_id: K, version: Version, timestamp: DateTime<Utc>) -> Self {
        Self {
            record_id: None,
            stream_id,
            version,
            timestamp,
        }
    }

    /// Attach a record id (e.g. the one returned by an append)
    pub fn with_record_id(mut self, record_id: RecordId) -> Self {
        self.record_id = Some(record_id);
        self
    }

    /// Record id, ignoring empty ids
    pub fn record_id(&self) -> Option<&RecordId> {
        self.record_id.as_ref().filter(|id| !id.is_empty())
    }
}
