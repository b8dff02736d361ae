//! Core types for the shardlog event journal
//!
//! This crate defines everything the storage and engine layers share:
//! - [`RecordId`], [`Version`], [`StreamKey`]: identity of records and streams
//! - [`LogEvent`] / [`EventMeta`]: what the engine needs to know about a host event
//! - [`EventRecord`] / [`RecordFilter`]: the stored unit and its query shape
//! - [`Error`] / [`StoreError`] / [`CodecError`]: the error taxonomy
//! - [`LogConfig`]: configuration surface
//! - [`EventCodec`] / [`TypeRegistry`]: the codec gateway
//! - [`Clock`]: time source used for shard enumeration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod record;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{EventCodec, TypeRegistry};
pub use config::{BucketWidth, LogConfig, PayloadFormat};
pub use error::{CodecError, Error, Result, StoreError, StoreResult, UniqueIndex};
pub use record::{EventInfo, EventList, EventRecord, RecordFilter};
pub use types::{EventMeta, LogEvent, RecordId, StreamKey, Version};
