use {
    async_trait::async_trait,
    serde::Serialize,
    tracing::{debug, warn},
};

use relaydesk_channels::{MessageBroadcast, log::StoredMessage};

use crate::{state::ClientMap, time::display_timestamp};

/// Wire shape of a `new_message` event pushed to dashboard sessions.
#[derive(Debug, Serialize)]
pub struct NewMessagePayload {
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    /// Display-formatted, fixed-offset rendering of the stored instant.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl From<&StoredMessage> for NewMessagePayload {
    fn from(m: &StoredMessage) -> Self {
        Self {
            sender_id: m.sender_id.clone(),
            sender_name: m.sender_name.clone(),
            text: m.body.clone(),
            timestamp: display_timestamp(m.created_at),
            media_type: m.media_type.clone(),
            media_url: m.media_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EventFrame<T> {
    event: &'static str,
    data: T,
}

/// Serialize an event frame once and fan it out to every connected
/// session, skipping closed senders silently.
pub async fn broadcast_event<T: Serialize>(clients: &ClientMap, event: &'static str, data: T) {
    let json = match serde_json::to_string(&EventFrame { event, data }) {
        Ok(j) => j,
        Err(e) => {
            warn!(event, "failed to serialize broadcast event: {e}");
            return;
        },
    };

    let clients = clients.read().await;
    debug!(event, sessions = clients.len(), "broadcasting event");
    for tx in clients.values() {
        // A send error means the session is gone; cleanup happens in its
        // connection task.
        let _ = tx.send(json.clone());
    }
}

/// Live fan-out of newly stored messages to connected dashboard viewers.
pub struct GatewayBroadcaster {
    clients: ClientMap,
}

impl GatewayBroadcaster {
    pub fn new(clients: ClientMap) -> Self {
        Self { clients }
    }
}

#[async_trait]
impl MessageBroadcast for GatewayBroadcaster {
    async fn broadcast_new_message(&self, message: &StoredMessage) {
        broadcast_event(&self.clients, "new_message", NewMessagePayload::from(message)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use tokio::sync::{RwLock, mpsc};

    use super::*;

    fn stored(body: &str) -> StoredMessage {
        StoredMessage {
            id: 1,
            sender_id: "111".into(),
            sender_name: "Alice".into(),
            body: body.into(),
            created_at: 1_700_000_000_000,
            media_type: None,
            media_url: None,
        }
    }

    #[tokio::test]
    async fn fans_out_to_all_sessions() {
        let clients: ClientMap = Arc::new(RwLock::new(HashMap::new()));
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        clients.write().await.insert("a".into(), tx1);
        clients.write().await.insert("b".into(), tx2);

        let b = GatewayBroadcaster::new(Arc::clone(&clients));
        b.broadcast_new_message(&stored("hi")).await;

        for rx in [&mut rx1, &mut rx2] {
            let frame: serde_json::Value =
                serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
            assert_eq!(frame["event"], "new_message");
            assert_eq!(frame["data"]["sender_name"], "Alice");
            assert_eq!(frame["data"]["text"], "hi");
            assert_eq!(frame["data"]["timestamp"], "2023-11-15 06:13:20");
        }
    }

    #[tokio::test]
    async fn closed_sessions_are_skipped() {
        let clients: ClientMap = Arc::new(RwLock::new(HashMap::new()));
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        drop(rx_dead);
        clients.write().await.insert("dead".into(), tx_dead);
        clients.write().await.insert("live".into(), tx_live);

        let b = GatewayBroadcaster::new(Arc::clone(&clients));
        b.broadcast_new_message(&stored("still here")).await;

        assert!(rx_live.recv().await.is_some());
    }
}
