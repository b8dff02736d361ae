//! Storage layer for shardlog
//!
//! This crate owns the boundary to the backing store:
//! - [`RecordStore`]: the async contract a document/record backend fulfils
//! - [`MemoryStore`]: DashMap-sharded in-memory backend with unique indexes
//! - [`ShardRef`] / [`ShardCatalog`]: naming and enumeration of time-bucketed shards
//! - [`TimeBucketCatalog`]: calendar-aligned catalog driven by [`LogConfig`]
//!
//! [`LogConfig`]: shardlog_core::LogConfig

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod shard;
pub mod store;

pub use memory::MemoryStore;
pub use shard::{ShardCatalog, ShardRef, TimeBucketCatalog};
pub use store::RecordStore;
