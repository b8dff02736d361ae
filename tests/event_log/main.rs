//! Event Log Test Suite
//!
//! End-to-end tests of the public `shardlog` surface: an [`EventLog`] built
//! over a [`MemoryStore`] with a pinned [`ManualClock`].
//!
//! ## Key Verification Points
//!
//! 1. Range reads return exactly `start < version <= end`, sorted, across shards
//! 2. Appends with the same idempotency token store one record
//! 3. Reads satisfied by an older shard never query newer shards
//! 4. Completion marking is idempotent and visible to reads
//! 5. Slow stores surface `StorageTimeout`, failing stores surface `Storage`
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test event_log
//! cargo test --test event_log append::
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shardlog::prelude::*;
use shardlog::{ManualClock, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

pub mod by_type;
pub mod sharding;
pub mod timeouts;

// =============================================================================
// ACCOUNT EVENTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opened {
    pub meta: EventMeta<String>,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposited {
    pub meta: EventMeta<String>,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub meta: EventMeta<String>,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    Opened(Opened),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
}

impl Account {
    pub fn meta(&self) -> &EventMeta<String> {
        match self {
            Account::Opened(e) => &e.meta,
            Account::Deposited(e) => &e.meta,
            Account::Withdrawn(e) => &e.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut EventMeta<String> {
        match self {
            Account::Opened(e) => &mut e.meta,
            Account::Deposited(e) => &mut e.meta,
            Account::Withdrawn(e) => &mut e.meta,
        }
    }

    /// Same event carrying the record id an append returned
    pub fn stored_as(mut self, record_id: RecordId) -> Self {
        self.meta_mut().record_id = Some(record_id);
        self
    }
}

impl LogEvent for Account {
    type Key = String;

    fn stream_id(&self) -> &String {
        &self.meta().stream_id
    }

    fn version(&self) -> Version {
        self.meta().version
    }

    fn type_code(&self) -> &str {
        match self {
            Account::Opened(_) => "Opened",
            Account::Deposited(_) => "Deposited",
            Account::Withdrawn(_) => "Withdrawn",
        }
    }

    fn record_id(&self) -> Option<&RecordId> {
        self.meta().record_id()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.meta().timestamp
    }
}

pub fn opened(stream: &str, at: DateTime<Utc>) -> Account {
    Account::Opened(Opened {
        meta: EventMeta::new(stream.to_string(), 1, at),
        owner: format!("owner-of-{}", stream),
    })
}

pub fn deposited(stream: &str, version: Version, at: DateTime<Utc>) -> Account {
    Account::Deposited(Deposited {
        meta: EventMeta::new(stream.to_string(), version, at),
        amount: 100,
    })
}

pub fn withdrawn(stream: &str, version: Version, at: DateTime<Utc>) -> Account {
    Account::Withdrawn(Withdrawn {
        meta: EventMeta::new(stream.to_string(), version, at),
        amount: 40,
    })
}

pub fn registry(format: PayloadFormat) -> TypeRegistry<Account> {
    let mut registry = TypeRegistry::new(format);
    registry
        .register("Opened", Account::Opened, |e| match e {
            Account::Opened(body) => Some(body),
            _ => None,
        })
        .register("Deposited", Account::Deposited, |e| match e {
            Account::Deposited(body) => Some(body),
            _ => None,
        })
        .register("Withdrawn", Account::Withdrawn, |e| match e {
            Account::Withdrawn(body) => Some(body),
            _ => None,
        });
    registry
}

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

pub fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .expect("valid date")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Log plus handles on its store and clock
pub struct TestLog {
    pub log: EventLog<Account>,
    pub store: Arc<MemoryStore<String>>,
    pub clock: Arc<ManualClock>,
}

impl TestLog {
    /// Monthly shards from 2024-01, clock at 2024-06-15
    pub fn new() -> Self {
        Self::with_config(
            LogConfig::default()
                .with_database("bank")
                .with_origin(utc(2024, 1, 1)),
        )
    }

    pub fn with_config(config: LogConfig) -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::<String>::new());
        let clock = Arc::new(ManualClock::new(utc(2024, 6, 15)));
        let log = EventLog::<Account>::builder()
            .config(config)
            .store(store.clone())
            .clock(clock.clone())
            .registry(registry(PayloadFormat::MessagePack))
            .build()
            .expect("log should build");
        Self { log, store, clock }
    }

    /// Append with encoding and default options
    pub async fn append(&self, event: &Account) -> AppendOutcome {
        self.log
            .append_event(event, AppendOptions::new())
            .await
            .expect("append should succeed")
    }
}

pub fn versions(list: &EventList<Account>) -> Vec<Version> {
    list.iter().map(|info| info.event.version()).collect()
}

pub fn stream(name: &str) -> String {
    name.to_string()
}

pub const SHORT: Duration = Duration::from_millis(50);
