//! Per-call deadline for store operations

use shardlog_core::{Error, Result, StoreResult};
use shardlog_storage::ShardRef;
use std::future::Future;
use std::time::Duration;

/// Run one store call under `limit`
///
/// The outer result carries the deadline, the inner one the store outcome, so
/// callers can inspect a duplicate key before converting it with `?`.
pub(crate) async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    shard: &ShardRef,
    call: F,
) -> Result<StoreResult<T>>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => Ok(outcome),
        Err(_) => {
            let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(
                operation,
                shard = %shard,
                timeout_ms,
                "store call exceeded deadline"
            );
            Err(Error::StorageTimeout {
                operation,
                shard: shard.qualified_name().to_string(),
                timeout_ms,
            })
        }
    }
}
