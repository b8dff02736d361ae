//! Completion bookkeeping
//!
//! Once a host has applied an event's downstream effects it marks the record
//! complete. The flag only moves from false to true and marking twice is fine.

use crate::deadline::with_deadline;
use chrono::{DateTime, Utc};
use shardlog_core::{Error, LogEvent, RecordId, Result, StreamKey};
use shardlog_storage::{RecordStore, ShardCatalog};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sets the completion flag of stored records
pub struct CompletionTracker<K: StreamKey> {
    store: Arc<dyn RecordStore<K>>,
    catalog: Arc<dyn ShardCatalog>,
    timeout: Duration,
}

impl<K: StreamKey> CompletionTracker<K> {
    /// Create a tracker with a per-call deadline of `timeout`
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

    /// Mark the record behind `event` complete
    ///
    /// The event must carry the non-empty record id it was stored under.
    pub async fn mark_complete<E>(&self, event: &E) -> Result<()>
    where
        E: LogEvent<Key = K>,
    {
        let record_id = event.record_id().filter(|id| !id.is_empty()).ok_or_else(|| {
            Error::InvalidInput(format!(
                "event {:?}@{} has no record id",
                event.stream_id(),
                event.version()
            ))
        })?;
        self.mark_complete_by_id(record_id, event.timestamp()).await
    }

    /// Mark record `record_id`, written at `timestamp`, complete
    pub async fn mark_complete_by_id(
        &self,
        record_id: &RecordId,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let shard = self.catalog.shard_for(timestamp)?;
        with_deadline(
            self.timeout,
            "set_complete",
            &shard,
            self.store.set_complete(&shard, record_id),
        )
        .await??;
        debug!(shard = %shard, record_id = %record_id, "marked record complete");
        Ok(())
    }
}

impl<K: StreamKey> Clone for CompletionTracker<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            timeout: self.timeout,
        }
    }
}
