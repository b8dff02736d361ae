//! Ordered reads across time shards
//!
//! Both reads walk the catalog's shard sequence oldest first, decode what each
//! shard returns, and stop as soon as a shard has produced the requested upper
//! version. Results are merged and sorted by version before returning.
//!
//! A read is all-or-nothing: a timeout, store failure or decode failure on any
//! shard aborts it.

use crate::deadline::with_deadline;
use chrono::{DateTime, Utc};
use shardlog_core::{EventCodec, EventInfo, EventList, LogEvent, RecordFilter, Result, Version};
use shardlog_storage::{RecordStore, ShardCatalog};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Read side of the event log
pub struct EventLogReader<E: LogEvent> {
    store: Arc<dyn RecordStore<E::Key>>,
    catalog: Arc<dyn ShardCatalog>,
    codec: Arc<dyn EventCodec<E>>,
    timeout: Duration,
}

impl<E: LogEvent> EventLogReader<E> {
    /// Create a reader with a per-call deadline of `timeout`
    pub fn new(
        store: Arc<dyn RecordStore<E::Key>>,
        catalog: Arc<dyn ShardCatalog>,
        codec: Arc<dyn EventCodec<E>>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            catalog,
            codec,
            timeout,
        }
    }

    /// Events of `stream_id` with `start_version < version <= end_version`
    ///
    /// Each record is decoded with its stored type code. `since` limits the
    /// shards visited to those at or after it; `None` visits every shard.
    pub async fn get_range(
        &self,
        stream_id: &E::Key,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>> {
        if start_version >= end_version {
            return Ok(Vec::new());
        }
        let filter = RecordFilter::version_range(stream_id.clone(), start_version, end_version);
        self.scan(filter, None, end_version, since).await
    }

    /// Events of `stream_id` tagged `type_code` with
    /// `start_version < version <= end_version`
    ///
    /// Every record is decoded as `type_code`.
    pub async fn get_by_type(
        &self,
        stream_id: &E::Key,
        type_code: &str,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>> {
        if start_version >= end_version {
            return Ok(Vec::new());
        }
        let filter = RecordFilter::of_type(stream_id.clone(), type_code, start_version);
        self.scan(filter, Some(type_code), end_version, since)
            .await
    }

    async fn scan(
        &self,
        filter: RecordFilter<E::Key>,
        decode_as: Option<&str>,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>> {
        let mut events: EventList<E> = Vec::new();
        let mut read_version: Version = 0;

        for shard in self.catalog.shards_for(since) {
            let records =
                with_deadline(self.timeout, "find", &shard, self.store.find(&shard, &filter))
                    .await??;
            let fetched = records.len();

            for record in records {
                let type_code = decode_as.unwrap_or(record.type_code.as_str());
                let event = self.codec.decode(type_code, &record.payload)?;
                let version = event.version();
                read_version = read_version.max(version);
                if version <= end_version {
                    events.push(EventInfo {
                        event,
                        is_complete: record.is_complete,
                    });
                }
            }

            debug!(
                shard = %shard,
                stream = ?filter.stream_id,
                fetched,
                read_version,
                "scanned shard"
            );

            if read_version >= end_version {
                debug!(shard = %shard, end_version, "read satisfied, skipping newer shards");
                break;
            }
        }

        events.sort_by_key(|info| info.event.version());
        Ok(events)
    }
}

impl<E: LogEvent> Clone for EventLogReader<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            catalog: Arc::clone(&self.catalog),
            codec: Arc::clone(&self.codec),
            timeout: self.timeout,
        }
    }
}
