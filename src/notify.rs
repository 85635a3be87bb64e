use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// An outbound message. Delivery is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub from: String,
    pub to: String,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Outbound message sender. Callers treat failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes every notification to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        let json = serde_json::to_string(notification).map_err(|e| NotifyError(e.to_string()))?;
        tracing::info!(to = %notification.to, "notification: {json}");
        Ok(())
    }
}

/// Fans notifications out to subscribers, one broadcast channel per
/// recipient address (primary and bcc).
pub struct BroadcastNotifier {
    channels: DashMap<String, broadcast::Sender<Notification>>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to messages addressed to `address`. Creates the channel if needed.
    pub fn subscribe(&self, address: &str) -> broadcast::Receiver<Notification> {
        self.channels
            .entry(address.to_ascii_lowercase())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    pub fn unsubscribe_all(&self, address: &str) {
        self.channels.remove(&address.to_ascii_lowercase());
    }

    fn deliver(&self, address: &str, notification: &Notification) {
        if let Some(sender) = self.channels.get(&address.to_ascii_lowercase()) {
            let _ = sender.send(notification.clone());
        }
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    /// No-op for addresses nobody listens on.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.deliver(&notification.to, notification);
        for address in &notification.bcc {
            self.deliver(address, notification);
        }
        Ok(())
    }
}
