use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::store::BookingStore;

/// Compact the WAL if at least `threshold` events were appended since the
/// last compaction. Returns whether a compaction ran.
pub async fn compact_if_needed(store: &BookingStore, threshold: u64) -> bool {
    let appended = store.wal_appends_since_compact().await;
    if appended < threshold {
        return false;
    }
    match store.compact().await {
        Ok(()) => {
            metrics::counter!(crate::observability::WAL_COMPACTIONS_TOTAL).increment(1);
            info!("compacted WAL after {appended} appends");
            true
        }
        Err(e) => {
            tracing::error!("WAL compaction failed: {e}");
            false
        }
    }
}

/// Background task: check every `every` and compact past `threshold`.
pub async fn run_compactor(store: Arc<BookingStore>, threshold: u64, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        compact_if_needed(&store, threshold).await;
    }
}
