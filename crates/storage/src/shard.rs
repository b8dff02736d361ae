//! Shard naming and enumeration
//!
//! A shard holds every record whose timestamp falls in one time bucket. Reads
//! walk shards oldest first so a version-ascending scan moves forward in time;
//! writes land in exactly one shard.

use chrono::{DateTime, Utc};
use shardlog_core::{BucketWidth, Clock, Error, LogConfig, Result};
use std::sync::Arc;

/// Reference to a physical shard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShardRef {
    database: String,
    name: String,
    qualified: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ShardRef {
    /// Create a reference to shard `name` in `database` covering `[start, end)`
    pub fn new(
        database: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let database = database.into();
        let name = name.into();
        let qualified = format!("{}.{}", database, name);
        Self {
            database,
            name,
            qualified,
            start,
            end,
        }
    }

    /// Database / namespace holding the shard
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Shard name within its database
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `{database}.{name}`, unique across databases
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// First instant covered by the shard
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// First instant after the shard
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether `ts` falls in this shard's bucket
    pub fn covers(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl std::fmt::Display for ShardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified)
    }
}

/// Maps time to shards
pub trait ShardCatalog: Send + Sync {
    /// Shards that may hold events at or after `since`, oldest first
    ///
    /// `None` means every known shard.
    fn shards_for(&self, since: Option<DateTime<Utc>>) -> Vec<ShardRef>;

    /// The single shard a write at `timestamp` goes to
    ///
    /// Fails with [`Error::InvalidInput`] when no read sequence would ever
    /// return that shard.
    fn shard_for(&self, timestamp: DateTime<Utc>) -> Result<ShardRef>;
}

/// Catalog of calendar-aligned buckets
///
/// Known shards run from the bucket containing the configured origin to the
/// bucket after the one containing now. The extra bucket keeps a record
/// stamped by a writer whose clock runs slightly ahead visible to readers.
/// Writes outside that window are rejected. Shard names are
/// `{prefix}_{label}`, e.g. `events_202401` for monthly buckets.
///
/// # Example
///
/// ```ignore
/// let catalog = TimeBucketCatalog::new(&config, Arc::new(SystemClock));
/// let target = catalog.shard_for(event.timestamp())?;
/// let scan = catalog.shards_for(Some(last_snapshot_time));
/// ```
pub struct TimeBucketCatalog {
    database: String,
    prefix: String,
    width: BucketWidth,
    origin: DateTime<Utc>,
    clock: Arc<dyn Clock>,
}

impl TimeBucketCatalog {
    /// Build a catalog from configuration
    pub fn new(config: &LogConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            database: config.database.clone(),
            prefix: config.shard_prefix.clone(),
            width: config.bucket_width,
            origin: config.bucket_width.floor(config.origin),
            clock,
        }
    }

    /// Bucket width of this catalog
    pub fn bucket_width(&self) -> BucketWidth {
        self.width
    }

    /// Start of the newest bucket readers enumerate
    fn horizon(&self) -> DateTime<Utc> {
        let current = self.width.floor(self.clock.now());
        self.width.next(current).unwrap_or(current)
    }

    /// `None` when the bucket has no representable end
    fn shard_at(&self, start: DateTime<Utc>) -> Option<ShardRef> {
        let end = self.width.next(start)?;
        Some(ShardRef::new(
            self.database.as_str(),
            format!("{}_{}", self.prefix, self.width.label(start)),
            start,
            end,
        ))
    }
}

impl ShardCatalog for TimeBucketCatalog {
    fn shards_for(&self, since: Option<DateTime<Utc>>) -> Vec<ShardRef> {
        let lower = since.map_or(self.origin, |ts| self.width.floor(ts).max(self.origin));
        // a bound in the future still yields the bucket it falls in
        let upper = self.horizon().max(lower);

        let mut shards = Vec::new();
        let mut start = lower;
        while start <= upper {
            let Some(shard) = self.shard_at(start) else {
                break;
            };
            start = shard.end();
            shards.push(shard);
        }
        shards
    }

    fn shard_for(&self, timestamp: DateTime<Utc>) -> Result<ShardRef> {
        let start = self.width.floor(timestamp);
        if start < self.origin {
            return Err(Error::InvalidInput(format!(
                "timestamp {} is before the log origin {}",
                timestamp, self.origin
            )));
        }
        let horizon = self.horizon();
        if start > horizon {
            return Err(Error::InvalidInput(format!(
                "timestamp {} is past the newest readable bucket starting {}",
                timestamp, horizon
            )));
        }
        self.shard_at(start).ok_or_else(|| {
            Error::InvalidInput(format!("timestamp {} has no representable bucket", timestamp))
        })
    }
}

impl std::fmt::Debug for TimeBucketCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeBucketCatalog")
            .field("database", &self.database)
            .field("prefix", &self.prefix)
            .field("width", &self.width)
            .field("origin", &self.origin)
            .finish()
    }
}
