//! Host-facing event log
//!
//! [`EventStorage`] is the seam a host runtime programs against.
//! [`EventLog`] implements it over one store, catalog and codec.

use crate::builder::EventLogBuilder;
use crate::completion::CompletionTracker;
use crate::reader::EventLogReader;
use crate::writer::{AppendOptions, AppendOutcome, EventLogWriter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shardlog_core::{EventCodec, EventList, LogConfig, LogEvent, RecordId, Result, Version};
use std::sync::Arc;

/// Event persistence as seen by a host runtime
#[async_trait]
pub trait EventStorage<E: LogEvent>: Send + Sync {
    /// Events with `start_version < version <= end_version`, ascending
    async fn get_range(
        &self,
        stream_id: &E::Key,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>>;

    /// Events tagged `type_code` with `start_version < version <= end_version`, ascending
    async fn get_by_type(
        &self,
        stream_id: &E::Key,
        type_code: &str,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>>;

    /// Append an event whose body is already encoded
    async fn append(
        &self,
        event: &E,
        payload: Vec<u8>,
        options: AppendOptions,
    ) -> Result<AppendOutcome>;

    /// Flag the stored record of `event` as applied downstream
    async fn mark_complete(&self, event: &E) -> Result<()>;
}

/// Time-sharded event log
///
/// Cloning is cheap; clones share the same store, catalog and codec.
///
/// # Example
///
/// ```ignore
/// let log = EventLog::builder()
///     .config(LogConfig::load("shardlog.toml")?)
///     .registry(registry)
///     .build()?;
///
/// let outcome = log.append_event(&event, AppendOptions::new()).await?;
/// let history = log.get_range(&stream, 0, outcome_version, None).await?;
/// ```
pub struct EventLog<E: LogEvent> {
    reader: EventLogReader<E>,
    writer: EventLogWriter<E::Key>,
    tracker: CompletionTracker<E::Key>,
    codec: Arc<dyn EventCodec<E>>,
    config: Arc<LogConfig>,
}

impl<E: LogEvent> EventLog<E> {
    /// Start building a log
    pub fn builder() -> EventLogBuilder<E> {
        EventLogBuilder::new()
    }

    pub(crate) fn from_parts(
        reader: EventLogReader<E>,
        writer: EventLogWriter<E::Key>,
        tracker: CompletionTracker<E::Key>,
        codec: Arc<dyn EventCodec<E>>,
        config: LogConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            tracker,
            codec,
            config: Arc::new(config),
        }
    }

    /// Configuration the log was built with
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Read side
    pub fn reader(&self) -> &EventLogReader<E> {
        &self.reader
    }

    /// Write side
    pub fn writer(&self) -> &EventLogWriter<E::Key> {
        &self.writer
    }

    /// Completion side
    pub fn tracker(&self) -> &CompletionTracker<E::Key> {
        &self.tracker
    }

    /// Encode `event` with the log's codec and append it
    pub async fn append_event(&self, event: &E, options: AppendOptions) -> Result<AppendOutcome> {
        let payload = self.codec.encode(event)?;
        self.writer.append(event, payload, options).await
    }

    /// Mark a record complete by the id and timestamp returned from an append
    pub async fn mark_complete_by_id(
        &self,
        record_id: &RecordId,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.tracker.mark_complete_by_id(record_id, timestamp).await
    }
}

impl<E: LogEvent> Clone for EventLog<E> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            writer: self.writer.clone(),
            tracker: self.tracker.clone(),
            codec: Arc::clone(&self.codec),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E: LogEvent> std::fmt::Debug for EventLog<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("database", &self.config.database)
            .field("shard_prefix", &self.config.shard_prefix)
            .field("bucket_width", &self.config.bucket_width)
            .finish()
    }
}

#[async_trait]
impl<E: LogEvent> EventStorage<E> for EventLog<E> {
    async fn get_range(
        &self,
        stream_id: &E::Key,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>> {
        self.reader
            .get_range(stream_id, start_version, end_version, since)
            .await
    }

    async fn get_by_type(
        &self,
        stream_id: &E::Key,
        type_code: &str,
        start_version: Version,
        end_version: Version,
        since: Option<DateTime<Utc>>,
    ) -> Result<EventList<E>> {
        self.reader
            .get_by_type(stream_id, type_code, start_version, end_version, since)
            .await
    }

    async fn append(
        &self,
        event: &E,
        payload: Vec<u8>,
        options: AppendOptions,
    ) -> Result<AppendOutcome> {
        self.writer.append(event, payload, options).await
    }

    async fn mark_complete(&self, event: &E) -> Result<()> {
        self.tracker.mark_complete(event).await
    }
}
