//! Configuration for a shardlog event log
//!
//! All fields have defaults, so a TOML file only needs to name what differs:
//!
//! ```toml
//! database = "orders"
//! bucket_width = "daily"
//! origin = "2024-01-01T00:00:00Z"
//! query_timeout_ms = 1500
//! ```

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default per-call deadline for store operations
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 3000;

/// Partition granularity, applied uniformly across the log
///
/// Buckets are aligned to UTC calendar boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketWidth {
    /// One shard per hour
    Hourly,
    /// One shard per day
    Daily,
    /// One shard per calendar month
    #[default]
    Monthly,
    /// One shard per calendar year
    Yearly,
}

impl BucketWidth {
    /// Start of the bucket containing `ts`
    pub fn floor(self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        match self {
            BucketWidth::Hourly => {
                date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(i64::from(ts.hour()))
            }
            BucketWidth::Daily => date.and_time(NaiveTime::MIN).and_utc(),
            BucketWidth::Monthly => {
                (date - Duration::days(i64::from(date.day0())))
                    .and_time(NaiveTime::MIN)
                    .and_utc()
            }
            BucketWidth::Yearly => {
                (date - Duration::days(i64::from(date.ordinal0())))
                    .and_time(NaiveTime::MIN)
                    .and_utc()
            }
        }
    }

    /// Start of the bucket following the one starting at `start`
    ///
    /// `None` when that instant is not representable.
    pub fn next(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            BucketWidth::Hourly => start.checked_add_signed(Duration::hours(1)),
            BucketWidth::Daily => start.checked_add_signed(Duration::days(1)),
            BucketWidth::Monthly => start.checked_add_months(Months::new(1)),
            BucketWidth::Yearly => start.checked_add_months(Months::new(12)),
        }
    }

    /// Name suffix of the bucket starting at `start`
    pub fn label(self, start: DateTime<Utc>) -> String {
        let pattern = match self {
            BucketWidth::Hourly => "%Y%m%d%H",
            BucketWidth::Daily => "%Y%m%d",
            BucketWidth::Monthly => "%Y%m",
            BucketWidth::Yearly => "%Y",
        };
        start.format(pattern).to_string()
    }
}

/// Encoding used by the built-in type registry for event payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PayloadFormat {
    /// MessagePack with named fields
    #[default]
    #[serde(rename = "msgpack")]
    MessagePack,
    /// UTF-8 JSON
    #[serde(rename = "json")]
    Json,
}

/// Event log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Target database / namespace holding the shards
    pub database: String,
    /// Prefix of every shard name (`{prefix}_{bucket label}`)
    pub shard_prefix: String,
    /// Partition granularity
    pub bucket_width: BucketWidth,
    /// Earliest instant the log may hold events for
    ///
    /// Unbounded reads enumerate shards from this bucket up to now.
    pub origin: DateTime<Utc>,
    /// Deadline for every individual store call, in milliseconds
    pub query_timeout_ms: u64,
    /// Payload format of the built-in type registry
    pub payload_format: PayloadFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            database: "event_log".to_string(),
            shard_prefix: "events".to_string(),
            bucket_width: BucketWidth::default(),
            origin: Utc.timestamp_opt(1_577_836_800, 0).single().unwrap_or_default(),
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
            payload_format: PayloadFormat::default(),
        }
    }
}

impl LogConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: LogConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), database = %config.database, "loaded log config");
        Ok(config)
    }

    /// Check invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::Config("database must not be empty".into()));
        }
        if self.shard_prefix.trim().is_empty() {
            return Err(Error::Config("shard_prefix must not be empty".into()));
        }
        // qualified shard names are `{database}.{name}`
        if self.shard_prefix.contains('.') {
            return Err(Error::Config(format!(
                "shard_prefix must not contain '.': {}",
                self.shard_prefix
            )));
        }
        if self.query_timeout_ms == 0 {
            return Err(Error::Config("query_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Per-call deadline as a Duration
    pub fn query_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.query_timeout_ms)
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the partition granularity
    pub fn with_bucket_width(mut self, width: BucketWidth) -> Self {
        self.bucket_width = width;
        self
    }

    /// Set the earliest instant the log may hold events for
    pub fn with_origin(mut self, origin: DateTime<Utc>) -> Self {
        self.origin = origin;
        self
    }

    /// Set the per-call deadline
    pub fn with_query_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.query_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the payload format of the built-in registry
    pub fn with_payload_format(mut self, format: PayloadFormat) -> Self {
        self.payload_format = format;
        self
    }
}
