use std::net::SocketAddr;

// ── Booking lifecycle ───────────────────────────────────────────

/// Counter: bookings accepted into `pending`.
pub const BOOKINGS_SUBMITTED_TOTAL: &str = "venuebook_bookings_submitted_total";

/// Counter: submissions refused because of an approved booking.
pub const BOOKING_CONFLICTS_TOTAL: &str = "venuebook_booking_conflicts_total";

/// Counter: approve/reject transitions. Labels: status.
pub const BOOKING_TRANSITIONS_TOTAL: &str = "venuebook_booking_transitions_total";

/// Counter: disabled slots created.
pub const SLOTS_DISABLED_TOTAL: &str = "venuebook_slots_disabled_total";

/// Counter: venues deleted (with their bookings).
pub const VENUES_DELETED_TOTAL: &str = "venuebook_venues_deleted_total";

// ── Notifications ───────────────────────────────────────────────

pub const NOTIFICATIONS_SENT_TOTAL: &str = "venuebook_notifications_sent_total";

pub const NOTIFICATIONS_FAILED_TOTAL: &str = "venuebook_notifications_failed_total";

// ── Store ───────────────────────────────────────────────────────

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "venuebook_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "venuebook_wal_flush_batch_size";

/// Counter: WAL compactions performed.
pub const WAL_COMPACTIONS_TOTAL: &str = "venuebook_wal_compactions_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), metrics_exporter_prometheus::BuildError> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}
