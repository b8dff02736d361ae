//! Deadline and Failure Tests
//!
//! Every store call runs under `query_timeout_ms`. A slow call fails the whole
//! operation with `StorageTimeout`; other store failures surface as `Storage`.

use crate::*;
use async_trait::async_trait;
use shardlog::{EventRecord, RecordFilter, RecordStore, ShardRef, StoreError, StoreResult};

fn slow_log() -> TestLog {
    let t = TestLog::with_config(
        LogConfig::default()
            .with_database("bank")
            .with_origin(utc(2024, 1, 1))
            .with_query_timeout(SHORT),
    );
    t.store.set_latency(Some(SHORT * 4));
    t
}

fn assert_timeout(err: Error, expected_operation: &str) {
    match err {
        Error::StorageTimeout {
            operation,
            timeout_ms,
            ..
        } => {
            assert_eq!(operation, expected_operation);
            assert_eq!(timeout_ms, 50);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

// =============================================================================
// SLOW STORE
// =============================================================================

#[tokio::test]
async fn test_slow_read_times_out() {
    let t = slow_log();
    let err = t
        .log
        .get_range(&stream("A"), 0, 1, None)
        .await
        .expect_err("store is too slow");
    assert!(err.is_retryable());
    assert_timeout(err, "find");
}

#[tokio::test]
async fn test_slow_type_read_times_out() {
    let t = slow_log();
    let err = t
        .log
        .get_by_type(&stream("A"), "Deposited", 0, 1, None)
        .await
        .expect_err("store is too slow");
    assert_timeout(err, "find");
}

#[tokio::test]
async fn test_slow_append_times_out() {
    let t = slow_log();
    let err = t
        .log
        .append_event(&opened("A", utc(2024, 1, 2)), AppendOptions::new())
        .await
        .expect_err("store is too slow");
    assert_timeout(err, "insert");
}

#[tokio::test]
async fn test_slow_mark_complete_times_out() {
    let t = slow_log();
    let err = t
        .log
        .mark_complete_by_id(&RecordId::new("r"), utc(2024, 1, 2))
        .await
        .expect_err("store is too slow");
    assert_timeout(err, "set_complete");
}

#[tokio::test]
async fn test_store_recovers_when_latency_drops() {
    let t = slow_log();
    t.store.set_latency(None);

    let outcome = t.append(&opened("A", utc(2024, 1, 2))).await;
    assert!(outcome.stored);
}

// =============================================================================
// FAILING STORE
// =============================================================================

struct UnavailableStore;

#[async_trait]
impl RecordStore<String> for UnavailableStore {
    async fn find(
        &self,
        _shard: &ShardRef,
        _filter: &RecordFilter<String>,
    ) -> StoreResult<Vec<EventRecord<String>>> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn insert(&self, _shard: &ShardRef, _record: EventRecord<String>) -> StoreResult<()> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn set_complete(&self, _shard: &ShardRef, _record_id: &RecordId) -> StoreResult<()> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

fn unavailable_log() -> EventLog<Account> {
    EventLog::<Account>::builder()
        .config(LogConfig::default().with_origin(utc(2024, 1, 1)))
        .store(Arc::new(UnavailableStore))
        .registry(registry(PayloadFormat::Json))
        .build()
        .expect("log should build")
}

#[tokio::test]
async fn test_backend_failures_surface_verbatim() {
    init_tracing();
    let log = unavailable_log();

    let read = log
        .get_range(&stream("A"), 0, 1, None)
        .await
        .expect_err("backend down");
    assert!(matches!(read, Error::Storage(StoreError::Backend(_))));
    assert!(read.is_retryable());

    let append = log
        .append_event(&opened("A", utc(2024, 1, 2)), AppendOptions::new())
        .await
        .expect_err("backend down");
    assert!(matches!(append, Error::Storage(StoreError::Backend(_))));

    let mark = log
        .mark_complete_by_id(&RecordId::new("r"), utc(2024, 1, 2))
        .await
        .expect_err("backend down");
    assert!(matches!(mark, Error::Storage(StoreError::Backend(_))));
}
