//! # shardlog
//!
//! Time-sharded, idempotent event journal for event-sourced systems.
//!
//! Events are appended per stream with caller-assigned versions, stored in the
//! time bucket of their timestamp, and read back in version order across
//! buckets. Appends are deduplicated by message id, and records can be flagged
//! complete once their downstream effects are applied.
//!
//! ## Quick Start
//!
//! ```ignore
//! use shardlog::prelude::*;
//!
//! let mut registry = TypeRegistry::new(PayloadFormat::MessagePack);
//! registry.register("Opened", Account::Opened, |e| match e {
//!     Account::Opened(body) => Some(body),
//!     _ => None,
//! });
//!
//! let log = EventLog::<Account>::builder()
//!     .config(LogConfig::load("shardlog.toml")?)
//!     .registry(registry)
//!     .build()?;
//!
//! let outcome = log
//!     .append_event(&opened, AppendOptions::new().with_idempotency_token(command_id))
//!     .await?;
//! let history = log.get_range(&account_id, 0, 1, None).await?;
//! log.mark_complete_by_id(&outcome.record_id, opened.timestamp()).await?;
//! ```
//!
//! ## Layers
//!
//! - [`shardlog_core`]: ids, records, errors, configuration, codec gateway
//! - [`shardlog_storage`]: backing-store seam, in-memory store, shard catalog
//! - [`shardlog_engine`]: reader, writer, completion tracker, [`EventLog`]

#![warn(missing_docs)]

pub mod prelude;

pub use shardlog_core::{
    BucketWidth, Clock, CodecError, Error, EventCodec, EventInfo, EventList, EventMeta,
    EventRecord, LogConfig, LogEvent, ManualClock, PayloadFormat, RecordFilter, RecordId, Result,
    StoreError, StoreResult, StreamKey, SystemClock, TypeRegistry, UniqueIndex, Version,
};
pub use shardlog_engine::{
    AppendOptions, AppendOutcome, CompletionTracker, EventLog, EventLogBuilder, EventLogReader,
    EventLogWriter, EventStorage,
};
pub use shardlog_storage::{MemoryStore, RecordStore, ShardCatalog, ShardRef, TimeBucketCatalog};

pub use shardlog_core;
pub use shardlog_engine;
pub use shardlog_storage;
