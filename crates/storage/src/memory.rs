//! In-memory record store
//!
//! DashMap keyed by qualified shard name, one shard per entry.
//! Unique indexes are log-wide and checked-and-updated under a single mutex so
//! concurrent inserts cannot both pass the duplicate check.
//!
//! # Test hooks
//!
//! - [`MemoryStore::set_latency`]: delay every call, to exercise deadlines
//! - [`MemoryStore::query_count`]: number of `find` calls per shard
//! - [`MemoryStore::records`]: raw shard contents

use crate::shard::ShardRef;
use crate::store::RecordStore;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use shardlog_core::{
    EventRecord, RecordFilter, RecordId, StoreError, StoreResult, StreamKey, UniqueIndex, Version,
};
use std::collections::HashSet;
use std::time::Duration;

/// Contents of one shard
///
/// Records keep insertion order; `by_id` gives O(1) lookup for updates.
#[derive(Debug)]
struct Shard<K> {
    records: Vec<EventRecord<K>>,
    by_id: FxHashMap<RecordId, usize>,
}

impl<K> Shard<K> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            by_id: FxHashMap::default(),
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

impl<K> Default for Shard<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct UniqueIndexes<K> {
    record_ids: HashSet<RecordId>,
    message_ids: HashSet<String>,
    stream_versions: HashSet<(K, Version)>,
}

/// In-memory [`RecordStore`]
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - `find`: only reads the target shard
/// - `insert`: serialized on the unique indexes, then locks the target shard
/// - `set_complete`: only locks the target shard
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(MemoryStore::<String>::new());
/// store.set_latency(Some(Duration::from_millis(100)));
/// ```
pub struct MemoryStore<K: StreamKey> {
    shards: DashMap<String, Shard<K>>,
    unique: Mutex<UniqueIndexes<K>>,
    queries: DashMap<String, u64>,
    latency: Mutex<Option<Duration>>,
}

impl<K: StreamKey> MemoryStore<K> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            unique: Mutex::new(UniqueIndexes {
                record_ids: HashSet::new(),
                message_ids: HashSet::new(),
                stream_versions: HashSet::new(),
            }),
            queries: DashMap::new(),
            latency: Mutex::new(None),
        }
    }

    /// Create a store that delays every call by `latency`
    pub fn with_latency(latency: Duration) -> Self {
        let store = Self::new();
        store.set_latency(Some(latency));
        store
    }

    /// Change the artificial delay applied to every call
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Number of `find` calls made against `shard`
    pub fn query_count(&self, shard: &ShardRef) -> u64 {
        self.queries
            .get(shard.qualified_name())
            .map(|count| *count)
            .unwrap_or(0)
    }

    /// Number of `find` calls made against any shard
    pub fn total_queries(&self) -> u64 {
        self.queries.iter().map(|entry| *entry.value()).sum()
    }

    /// Snapshot of the records stored in `shard`, in insertion order
    pub fn records(&self, shard: &ShardRef) -> Vec<EventRecord<K>> {
        self.shards
            .get(shard.qualified_name())
            .map(|s| s.records.clone())
            .unwrap_or_default()
    }

    /// Total number of records across all shards
    pub fn record_count(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Qualified names of shards holding at least one record, sorted
    pub fn shard_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.shards.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    async fn pause(&self) {
        let latency = *self.latency.lock();
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
    }

    fn find_now(&self, shard: &ShardRef, filter: &RecordFilter<K>) -> Vec<EventRecord<K>> {
        *self
            .queries
            .entry(shard.qualified_name().to_string())
            .or_insert(0) += 1;

        match self.shards.get(shard.qualified_name()) {
            Some(s) => s
                .records
                .iter()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn insert_now(&self, shard: &ShardRef, record: EventRecord<K>) -> StoreResult<()> {
        let mut unique = self.unique.lock();

        if unique.record_ids.contains(&record.record_id) {
            return Err(StoreError::DuplicateKey {
                index: UniqueIndex::RecordId,
                key: record.record_id.to_string(),
            });
        }
        if unique.message_ids.contains(&record.message_id) {
            return Err(StoreError::DuplicateKey {
                index: UniqueIndex::MessageId,
                key: record.message_id,
            });
        }
        let stream_version = (record.stream_id.clone(), record.version);
        if unique.stream_versions.contains(&stream_version) {
            return Err(StoreError::DuplicateKey {
                index: UniqueIndex::StreamVersion,
                key: format!("{:?}@{}", record.stream_id, record.version),
            });
        }

        unique.record_ids.insert(record.record_id.clone());
        unique.message_ids.insert(record.message_id.clone());
        unique.stream_versions.insert(stream_version);

        let mut target = self
            .shards
            .entry(shard.qualified_name().to_string())
            .or_default();
        let position = target.records.len();
        target.by_id.insert(record.record_id.clone(), position);
        target.records.push(record);
        Ok(())
    }

    fn set_complete_now(&self, shard: &ShardRef, record_id: &RecordId) -> StoreResult<()> {
        let not_found = || StoreError::NotFound {
            shard: shard.qualified_name().to_string(),
            record_id: record_id.to_string(),
        };

        let mut target = self
            .shards
            .get_mut(shard.qualified_name())
            .ok_or_else(not_found)?;
        let position = *target.by_id.get(record_id).ok_or_else(not_found)?;
        target.records[position].is_complete = true;
        Ok(())
    }
}

impl<K: StreamKey> Default for MemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StreamKey> std::fmt::Debug for MemoryStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("shards", &self.shards.len())
            .field("records", &self.record_count())
            .finish()
    }
}

#[async_trait]
impl<K: StreamKey> RecordStore<K> for MemoryStore<K> {
    async fn find(
        &self,
        shard: &ShardRef,
        filter: &RecordFilter<K>,
    ) -> StoreResult<Vec<EventRecord<K>>> {
        self.pause().await;
        Ok(self.find_now(shard, filter))
    }

    async fn insert(&self, shard: &ShardRef, record: EventRecord<K>) -> StoreResult<()> {
        self.pause().await;
        self.insert_now(shard, record)
    }

    async fn set_complete(&self, shard: &ShardRef, record_id: &RecordId) -> StoreResult<()> {
        self.pause().await;
        self.set_complete_now(shard, record_id)
    }
}
