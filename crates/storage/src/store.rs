//! Backing store contract
//!
//! A shard is a named collection of [`EventRecord`]s. A store must offer three
//! things per shard: filtered reads, unique-constrained inserts that report a
//! distinguishable duplicate outcome, and an in-place completion flag update.
//!
//! Implementations:
//! - [`MemoryStore`](crate::MemoryStore): in-process reference backend
//! - document databases (one collection per shard, unique indexes on
//!   `message_id` and `(stream_id, version)`)

use crate::shard::ShardRef;
use async_trait::async_trait;
use shardlog_core::{EventRecord, RecordFilter, RecordId, StoreResult, StreamKey};

/// Interface for record persistence.
#[async_trait]
pub trait RecordStore<K: StreamKey>: Send + Sync {
    /// Return every record of `shard` matching `filter`, in any order
    ///
    /// A shard that was never written to is empty, not an error.
    async fn find(&self, shard: &ShardRef, filter: &RecordFilter<K>)
        -> StoreResult<Vec<EventRecord<K>>>;

    /// Insert a record into `shard`
    ///
    /// Must fail with [`StoreError::DuplicateKey`] when the record collides
    /// on `record_id`, `message_id`, or `(stream_id, version)`, and must not
    /// store anything in that case.
    ///
    /// [`StoreError::DuplicateKey`]: shardlog_core::StoreError::DuplicateKey
    async fn insert(&self, shard: &ShardRef, record: EventRecord<K>) -> StoreResult<()>;

    /// Set `is_complete` on the record with `record_id` in `shard`
    ///
    /// Setting an already-set flag succeeds. A missing record fails with
    /// [`StoreError::NotFound`](shardlog_core::StoreError::NotFound).
    async fn set_complete(&self, shard: &ShardRef, record_id: &RecordId) -> StoreResult<()>;
}
