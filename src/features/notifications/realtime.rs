use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use crate::shared::constants::REALTIME_CHANNEL_CAPACITY;

/// A message pushed over the real-time channel
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    pub event: String,
    pub payload: serde_json::Value,
}

impl RealtimeMessage {
    pub fn new(event: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// In-process real-time hub: one global broadcast channel for dashboard
/// events, plus lazily created per-user channels for private notifications.
///
/// Delivery is at-most-once with no replay; clients recover missed items by
/// fetching persisted notifications on reconnect.
pub struct RealtimeHub {
    broadcast_tx: broadcast::Sender<RealtimeMessage>,
    user_channels: RwLock<HashMap<String, broadcast::Sender<RealtimeMessage>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(REALTIME_CHANNEL_CAPACITY);
        Self {
            broadcast_tx,
            user_channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to the global broadcast stream
    pub fn subscribe_all(&self) -> broadcast::Receiver<RealtimeMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Subscribe to a user's private stream, creating the channel on first use
    pub async fn subscribe_user(&self, user_id: &str) -> broadcast::Receiver<RealtimeMessage> {
        let mut channels = self.user_channels.write().await;
        channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(REALTIME_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Push a message to a single user's active connections. A send with no
    /// connected receiver is not an error; the persisted notification covers
    /// offline recipients.
    pub async fn publish_to_user(&self, user_id: &str, message: RealtimeMessage) {
        let mut channels = self.user_channels.write().await;
        if let Some(tx) = channels.get(user_id) {
            if tx.send(message).is_err() {
                // All receivers dropped; reclaim the channel
                channels.remove(user_id);
            }
        } else {
            tracing::debug!("No active connections for user {}, skipping push", user_id);
        }
    }

    /// Broadcast a message to every connected client
    pub fn broadcast(&self, message: RealtimeMessage) {
        // Err here just means nobody is listening right now
        let _ = self.broadcast_tx.send(message);
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_private_delivery_reaches_only_the_recipient() {
        let hub = RealtimeHub::new();
        let mut alice_rx = hub.subscribe_user("alice").await;
        let mut bob_rx = hub.subscribe_user("bob").await;

        hub.publish_to_user("alice", RealtimeMessage::new("report.status", serde_json::json!({"status": "in_progress"})))
            .await;

        let received = alice_rx.recv().await.unwrap();
        assert_eq!(received.event, "report.status");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_a_noop() {
        let hub = RealtimeHub::new();

        // Must not panic or error
        hub.publish_to_user("ghost", RealtimeMessage::new("x", serde_json::json!({})))
            .await;
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let hub = RealtimeHub::new();
        let mut rx1 = hub.subscribe_all();
        let mut rx2 = hub.subscribe_all();

        hub.broadcast(RealtimeMessage::new(
            "report.created",
            serde_json::json!({"id": "r1"}),
        ));

        assert_eq!(rx1.recv().await.unwrap().event, "report.created");
        assert_eq!(rx2.recv().await.unwrap().event, "report.created");
    }

    #[tokio::test]
    async fn test_channel_reclaimed_after_all_receivers_drop() {
        let hub = RealtimeHub::new();
        let rx = hub.subscribe_user("carol").await;
        drop(rx);

        hub.publish_to_user("carol", RealtimeMessage::new("a", serde_json::json!({})))
            .await;

        // A later subscribe gets a fresh channel and receives again
        let mut rx = hub.subscribe_user("carol").await;
        hub.publish_to_user("carol", RealtimeMessage::new("b", serde_json::json!({})))
            .await;
        assert_eq!(rx.recv().await.unwrap().event, "b");
    }
}
