//! Type-Filtered Read Tests
//!
//! - Only records tagged with the requested type code are returned
//! - The upper version bound applies to decoded versions
//! - Records of other types never leak in, even at the same version

use crate::*;
use async_trait::async_trait;
use shardlog::{
    EventCodec, EventRecord, RecordFilter, RecordStore, ShardRef, StoreError, StoreResult,
};

async fn seed(t: &TestLog) {
    t.append(&opened("A", utc(2024, 1, 1))).await;
    t.append(&deposited("A", 2, utc(2024, 1, 5))).await;
    t.append(&withdrawn("A", 3, utc(2024, 2, 5))).await;
    t.append(&deposited("A", 4, utc(2024, 2, 9))).await;
    t.append(&deposited("A", 5, utc(2024, 4, 9))).await;
    t.append(&deposited("B", 2, utc(2024, 1, 9))).await;
}

#[tokio::test]
async fn test_only_matching_type_is_returned() {
    let t = TestLog::new();
    seed(&t).await;

    let events = t
        .log
        .get_by_type(&stream("A"), "Deposited", 0, 10, None)
        .await
        .expect("read");
    assert_eq!(versions(&events), vec![2, 4, 5]);
    assert!(events
        .iter()
        .all(|info| matches!(info.event, Account::Deposited(_))));
}

#[tokio::test]
async fn test_upper_bound_applies_after_decoding() {
    let t = TestLog::new();
    seed(&t).await;

    let events = t
        .log
        .get_by_type(&stream("A"), "Deposited", 2, 4, None)
        .await
        .expect("read");
    assert_eq!(versions(&events), vec![4]);
}

#[tokio::test]
async fn test_type_read_exits_early() {
    let t = TestLog::new();
    seed(&t).await;

    t.log
        .get_by_type(&stream("A"), "Deposited", 0, 4, None)
        .await
        .expect("read");
    // January and February only
    assert_eq!(t.store.total_queries(), 2);
}

#[tokio::test]
async fn test_unmatched_type_code_reads_empty() {
    let t = TestLog::new();
    seed(&t).await;

    let none = t
        .log
        .get_by_type(&stream("A"), "Closed", 0, 10, None)
        .await
        .expect("read");
    assert!(none.is_empty());
}

// =============================================================================
// OVERLAPPING VERSIONS
// =============================================================================

/// Store serving a fixed record set without unique indexes
struct FixedStore {
    records: Vec<EventRecord<String>>,
}

#[async_trait]
impl RecordStore<String> for FixedStore {
    async fn find(
        &self,
        shard: &ShardRef,
        filter: &RecordFilter<String>,
    ) -> StoreResult<Vec<EventRecord<String>>> {
        Ok(self
            .records
            .iter()
            .filter(|r| shard.covers(r.timestamp) && filter.matches(r))
            .cloned()
            .collect())
    }

    async fn insert(&self, _shard: &ShardRef, _record: EventRecord<String>) -> StoreResult<()> {
        Err(StoreError::Backend("read only".into()))
    }

    async fn set_complete(&self, _shard: &ShardRef, _record_id: &RecordId) -> StoreResult<()> {
        Err(StoreError::Backend("read only".into()))
    }
}

fn fixed_record(event: &Account) -> EventRecord<String> {
    EventRecord {
        record_id: RecordId::generate(),
        stream_id: event.stream_id().clone(),
        version: event.version(),
        type_code: event.type_code().to_string(),
        payload: registry(PayloadFormat::Json).encode(event).expect("encode"),
        message_id: RecordId::generate().into_string(),
        is_complete: false,
        timestamp: event.timestamp(),
    }
}

#[tokio::test]
async fn test_other_types_at_same_version_are_excluded() {
    init_tracing();
    let opened = Account::Opened(Opened {
        meta: EventMeta::new(stream("A"), 2, utc(2024, 1, 4)),
        owner: "ada".into(),
    });
    let store = FixedStore {
        records: vec![
            fixed_record(&opened),
            fixed_record(&deposited("A", 2, utc(2024, 1, 5))),
            fixed_record(&withdrawn("A", 2, utc(2024, 2, 5))),
        ],
    };
    let log = EventLog::<Account>::builder()
        .config(LogConfig::default().with_origin(utc(2024, 1, 1)))
        .store(Arc::new(store))
        .clock(Arc::new(ManualClock::new(utc(2024, 6, 15))))
        .registry(registry(PayloadFormat::Json))
        .build()
        .expect("log should build");

    let deposits = log
        .get_by_type(&stream("A"), "Deposited", 0, 5, None)
        .await
        .expect("read");
    assert_eq!(versions(&deposits), vec![2]);
    assert!(matches!(deposits[0].event, Account::Deposited(_)));

    let withdrawals = log
        .get_by_type(&stream("A"), "Withdrawn", 1, 2, None)
        .await
        .expect("read");
    assert_eq!(versions(&withdrawals), vec![2]);
    assert!(matches!(withdrawals[0].event, Account::Withdrawn(_)));
}
