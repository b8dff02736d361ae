//! Idempotent appends
//!
//! A record lands in the shard of its event's timestamp. The store's unique
//! index on `message_id` makes an append happen at most once: a second append
//! with the same idempotency token is reported as `stored == false`, not as an
//! error.

use crate::deadline::with_deadline;
use shardlog_core::{
    EventRecord, Error, LogEvent, RecordId, Result, StoreError, StreamKey, UniqueIndex, Version,
};
use shardlog_storage::{RecordStore, ShardCatalog, ShardRef};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-append options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOptions {
    /// Deduplication key; the record id is used when absent
    pub idempotency_token: Option<String>,
    /// Current stream version the caller built this event on
    ///
    /// When set, the event must carry `expected_version + 1` and a clash on
    /// `(stream_id, version)` is a conflict rather than a duplicate.
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Options with no token and no version check
    pub fn new() -> Self {
        Self::default()
    }

    /// Deduplicate on `token`
    pub fn with_idempotency_token(mut self, token: impl Into<String>) -> Self {
        self.idempotency_token = Some(token.into());
        self
    }

    /// Require the stream to be at `version` before this append
    pub fn with_expected_version(mut self, version: Version) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// What an append did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Id of the record (reused from the event or freshly minted)
    pub record_id: RecordId,
    /// Deduplication key the record was written with
    pub message_id: String,
    /// Shard the record was written to
    pub shard: ShardRef,
    /// False when the append had already been recorded
    pub stored: bool,
}

/// Write side of the event log
pub struct EventLogWriter<K: StreamKey> {
    store: Arc<dyn RecordStore<K>>,
    catalog: Arc<dyn ShardCatalog>,
    timeout: Duration,
}

impl<K: StreamKey> EventLogWriter<K> {
    /// Create a writer with a per-call deadline of `timeout`
    pub fn new(
        store: Arc<dyn RecordStore<K>>,
        catalog: Arc<dyn ShardCatalog>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            timeout,
        }
    }

    /// Append `event` with its already encoded `payload`
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] when the catalog has no shard for the
    ///   event's timestamp
    /// - [`Error::VersionConflict`] when `options.expected_version` does not
    ///   match the event
    /// - [`Error::VersionTaken`] when `options.expected_version` is set and
    ///   the stream already holds the event's version
    /// - [`Error::StorageTimeout`] when the insert exceeds the deadline
    /// - [`Error::Storage`] for any other store failure
    pub async fn append<E>(
        &self,
        event: &E,
        payload: Vec<u8>,
        options: AppendOptions,
    ) -> Result<AppendOutcome>
    where
        E: LogEvent<Key = K>,
    {
        if let Some(expected) = options.expected_version {
            let wanted = expected.saturating_add(1);
            if event.version() != wanted {
                return Err(Error::VersionConflict {
                    stream: format!("{:?}", event.stream_id()),
                    expected: wanted,
                    actual: event.version(),
                });
            }
        }

        // an empty id counts as none
        let record_id = event
            .record_id()
            .filter(|id| !id.is_empty())
            .cloned()
            .unwrap_or_else(RecordId::generate);
        let message_id = options
            .idempotency_token
            .unwrap_or_else(|| record_id.as_str().to_string());
        let shard = self.catalog.shard_for(event.timestamp())?;

        let record = EventRecord {
            record_id: record_id.clone(),
            stream_id: event.stream_id().clone(),
            version: event.version(),
            type_code: event.type_code().to_string(),
            payload,
            message_id: message_id.clone(),
            is_complete: false,
            timestamp: event.timestamp(),
        };

        let inserted =
            with_deadline(self.timeout, "insert", &shard, self.store.insert(&shard, record))
                .await?;

        let stored = match inserted {
            Ok(()) => {
                debug!(
                    shard = %shard,
                    stream = ?event.stream_id(),
                    version = event.version(),
                    record_id = %record_id,
                    "appended event"
                );
                true
            }
            Err(StoreError::DuplicateKey {
                index: UniqueIndex::StreamVersion,
                ..
            }) if options.expected_version.is_some() => {
                return Err(Error::VersionTaken {
                    stream: format!("{:?}", event.stream_id()),
                    version: event.version(),
                });
            }
            Err(StoreError::DuplicateKey { index, key }) => {
                warn!(
                    shard = %shard,
                    stream = ?event.stream_id(),
                    version = event.version(),
                    type_code = event.type_code(),
                    record_id = %record_id,
                    message_id = %message_id,
                    %index,
                    key = %key,
                    "event already recorded, skipping append"
                );
                false
            }
            Err(e) => return Err(e.into()),
        };

        Ok(AppendOutcome {
            record_id,
            message_id,
            shard,
            stored,
        })
    }
}

impl<K: StreamKey> Clone for EventLogWriter<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            timeout: self.timeout,
        }
    }
}
