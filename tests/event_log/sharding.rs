//! Shard Placement Tests
//!
//! - Writes go to the bucket of the event timestamp
//! - Bucket width and database come from configuration
//! - Reads enumerate buckets up to the one after the clock's now
//! - Writes outside the readable window are rejected

use crate::*;
use shardlog::{ShardCatalog, TimeBucketCatalog};

#[tokio::test]
async fn test_monthly_placement() {
    let t = TestLog::new();
    t.append(&opened("A", utc(2024, 1, 31))).await;
    t.append(&deposited("A", 2, utc(2024, 2, 1))).await;
    t.append(&deposited("A", 3, utc(2024, 2, 28))).await;

    assert_eq!(
        t.store.shard_names(),
        vec!["bank.events_202401".to_string(), "bank.events_202402".to_string()]
    );
}

#[tokio::test]
async fn test_daily_placement_from_toml() {
    let config = LogConfig::from_toml_str(
        r#"
        database = "orders"
        shard_prefix = "journal"
        bucket_width = "daily"
        origin = "2024-06-01T00:00:00Z"
        "#,
    )
    .expect("valid config");
    let t = TestLog::with_config(config);

    let at = Utc.with_ymd_and_hms(2024, 6, 14, 23, 59, 59).single().expect("valid");
    let outcome = t.append(&opened("A", at)).await;
    assert_eq!(outcome.shard.qualified_name(), "orders.journal_20240614");

    let events = t.log.get_range(&stream("A"), 0, 1, None).await.expect("read");
    assert_eq!(versions(&events), vec![1]);
}

#[tokio::test]
async fn test_write_in_next_bucket_is_readable_now() {
    let t = TestLog::new();
    let outcome = t.append(&opened("A", utc(2024, 7, 1))).await;
    assert_eq!(outcome.shard.name(), "events_202407");

    let events = t.log.get_range(&stream("A"), 0, 1, None).await.expect("read");
    assert_eq!(versions(&events), vec![1]);
}

#[tokio::test]
async fn test_write_at_bucket_boundary_is_readable() {
    let t = TestLog::with_config(
        LogConfig::default()
            .with_bucket_width(BucketWidth::Hourly)
            .with_origin(utc(2024, 6, 15)),
    );
    t.clock
        .set(Utc.with_ymd_and_hms(2024, 6, 15, 9, 59, 59).single().expect("valid"));

    let at = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).single().expect("valid");
    t.append(&opened("A", at)).await;

    let events = t.log.get_range(&stream("A"), 0, 1, None).await.expect("read");
    assert_eq!(versions(&events), vec![1]);
}

#[tokio::test]
async fn test_write_beyond_next_bucket_is_rejected() {
    let t = TestLog::new();
    let err = t
        .log
        .append_event(&opened("A", utc(2024, 8, 3)), AppendOptions::new())
        .await
        .expect_err("outside the readable window");

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(t.store.record_count(), 0);
}

#[tokio::test]
async fn test_write_before_origin_is_rejected() {
    let t = TestLog::new();
    let err = t
        .log
        .append_event(&opened("A", utc(2023, 12, 31)), AppendOptions::new())
        .await
        .expect_err("before origin");

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(t.store.record_count(), 0);
}

#[tokio::test]
async fn test_custom_catalog_is_used() {
    init_tracing();
    let store = Arc::new(MemoryStore::<String>::new());
    let config = LogConfig::default()
        .with_database("archive")
        .with_bucket_width(BucketWidth::Yearly)
        .with_origin(utc(2020, 1, 1));
    let clock = Arc::new(ManualClock::new(utc(2024, 6, 1)));
    let catalog = Arc::new(TimeBucketCatalog::new(&config, clock));

    let log = EventLog::<Account>::builder()
        .store(store.clone())
        .catalog(catalog.clone())
        .registry(registry(PayloadFormat::Json))
        .build()
        .expect("log should build");

    let outcome = log
        .append_event(&opened("A", utc(2022, 3, 3)), AppendOptions::new())
        .await
        .expect("append");
    assert_eq!(outcome.shard.qualified_name(), "archive.events_2022");
    // 2020 through 2025
    assert_eq!(catalog.shards_for(None).len(), 6);

    let events = log.get_range(&stream("A"), 0, 1, None).await.expect("read");
    assert_eq!(versions(&events), vec![1]);
    // 2020, 2021, 2022
    assert_eq!(store.total_queries(), 3);
}
