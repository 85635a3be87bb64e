use std::sync::Arc;

use tracing::info;

use venuebook::compactor;
use venuebook::config::Config;
use venuebook::notify::LogNotifier;
use venuebook::{BookingManager, BookingStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    venuebook::observability::init(config.metrics_port)?;

    std::fs::create_dir_all(&config.data_dir)?;
    let store = Arc::new(BookingStore::open(&config.wal_path())?);
    let (users, venues, bookings) = store.counts().await;

    // The request layer embeds the manager; the host owns the store lifetime.
    let manager = BookingManager::new(store.clone(), Arc::new(LogNotifier))
        .with_from_address(config.notify_from.clone());

    info!("venuebook started");
    info!("  data_dir: {}", config.data_dir.display());
    info!("  state: {users} users, {venues} venues, {bookings} bookings");
    info!(
        "  compaction: every {:?} past {} appends",
        config.compact_interval, config.compact_threshold
    );
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );
    for venue in manager.list_venues().await? {
        info!(
            "  venue {} {:?}: capacity {}, window {}",
            venue.id, venue.title, venue.capacity, venue.time_allowed
        );
    }

    let compactor_task = tokio::spawn(compactor::run_compactor(
        store.clone(),
        config.compact_threshold,
        config.compact_interval,
    ));

    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to register SIGTERM handler: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    shutdown.await;

    info!("shutdown signal received, compacting before exit");
    compactor_task.abort();
    if let Err(e) = store.compact().await {
        tracing::error!("final compaction failed: {e}");
    }

    info!("venuebook stopped");
    Ok(())
}
