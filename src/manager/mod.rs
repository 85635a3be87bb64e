mod conflict;
mod lifecycle;
mod venues;

pub use conflict::check_no_conflict;

use std::sync::Arc;

use crate::notify::{Notification, Notifier};
use crate::repository::Repository;

pub const DEFAULT_FROM_ADDRESS: &str = "venue@localhost";

/// Booking lifecycle and venue administration on top of a [`Repository`]
/// and a [`Notifier`].
///
/// Every decision is made here; persistence and delivery are delegated.
/// Notifications are sent after the state change has been stored and their
/// failure never turns a successful operation into an error.
pub struct BookingManager {
    repo: Arc<dyn Repository>,
    notifier: Arc<dyn Notifier>,
    from_address: String,
}

impl BookingManager {
    pub fn new(repo: Arc<dyn Repository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
        }
    }

    /// Sender address for messages not sent on an admin's behalf.
    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.from_address = from.into();
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repo
    }

    async fn notify_best_effort(&self, notification: Notification) {
        match self.notifier.notify(&notification).await {
            Ok(()) => {
                metrics::counter!(crate::observability::NOTIFICATIONS_SENT_TOTAL).increment(1);
            }
            Err(e) => {
                metrics::counter!(crate::observability::NOTIFICATIONS_FAILED_TOTAL).increment(1);
                tracing::warn!(to = %notification.to, subject = %notification.subject, "{e}");
            }
        }
    }
}
