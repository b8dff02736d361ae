//! Builder for [`EventLog`]

use crate::completion::CompletionTracker;
use crate::log::EventLog;
use crate::reader::EventLogReader;
use crate::writer::EventLogWriter;
use shardlog_core::{Clock, Error, EventCodec, LogConfig, LogEvent, Result, SystemClock, TypeRegistry};
use shardlog_storage::{MemoryStore, RecordStore, ShardCatalog, TimeBucketCatalog};
use std::sync::Arc;
use tracing::info;

/// Builder for [`EventLog`]
///
/// Only the codec is required. Unset parts default to:
/// - store: a fresh [`MemoryStore`]
/// - clock: [`SystemClock`]
/// - catalog: a [`TimeBucketCatalog`] over the config and clock
///
/// # Example
///
/// ```ignore
/// let log = EventLog::<Account>::builder()
///     .config(LogConfig::default().with_bucket_width(BucketWidth::Daily))
///     .store(Arc::new(MongoRecordStore::connect(uri).await?))
///     .registry(registry)
///     .build()?;
/// ```
pub struct EventLogBuilder<E: LogEvent> {
    config: LogConfig,
    store: Option<Arc<dyn RecordStore<E::Key>>>,
    catalog: Option<Arc<dyn ShardCatalog>>,
    clock: Option<Arc<dyn Clock>>,
    codec: Option<Arc<dyn EventCodec<E>>>,
}

impl<E: LogEvent> EventLogBuilder<E> {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
            store: None,
            catalog: None,
            clock: None,
            codec: None,
        }
    }

    /// Use `config`
    pub fn config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist records in `store`
    pub fn store(mut self, store: Arc<dyn RecordStore<E::Key>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom shard catalog instead of calendar buckets
    pub fn catalog(mut self, catalog: Arc<dyn ShardCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Time source for shard enumeration
    ///
    /// Ignored when a custom catalog is set.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Decode and encode payloads with `codec`
    pub fn codec(mut self, codec: Arc<dyn EventCodec<E>>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Decode and encode payloads with a type registry
    pub fn registry(self, registry: TypeRegistry<E>) -> Self {
        self.codec(Arc::new(registry))
    }

    /// Validate the configuration and assemble the log
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the configuration is invalid or no codec was set.
    pub fn build(self) -> Result<EventLog<E>> {
        self.config.validate()?;
        let codec = self
            .codec
            .ok_or_else(|| Error::Config("an event codec is required".into()))?;

        let store: Arc<dyn RecordStore<E::Key>> = match self.store {
            Some(store) => store,
            None => Arc::new(MemoryStore::<E::Key>::new()),
        };
        let catalog: Arc<dyn ShardCatalog> = match self.catalog {
            Some(catalog) => catalog,
            None => {
                let clock: Arc<dyn Clock> = match self.clock {
                    Some(clock) => clock,
                    None => Arc::new(SystemClock),
                };
                Arc::new(TimeBucketCatalog::new(&self.config, clock))
            }
        };
        let timeout = self.config.query_timeout();

        info!(
            database = %self.config.database,
            shard_prefix = %self.config.shard_prefix,
            bucket_width = ?self.config.bucket_width,
            timeout_ms = self.config.query_timeout_ms,
            "event log ready"
        );

        Ok(EventLog::from_parts(
            EventLogReader::new(store.clone(), catalog.clone(), codec.clone(), timeout),
            EventLogWriter::new(store.clone(), catalog.clone(), timeout),
            CompletionTracker::new(store, catalog, timeout),
            codec,
            self.config,
        ))
    }
}

impl<E: LogEvent> Default for EventLogBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
