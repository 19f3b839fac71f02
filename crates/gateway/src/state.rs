use std::{collections::HashMap, sync::Arc};

use {
    secrecy::{ExposeSecret, Secret},
    tokio::sync::{RwLock, mpsc},
};

use {relaydesk_channels::log::ConversationLog, relaydesk_relay::Relay};

/// Connected dashboard sessions, keyed by connection id. Each entry is
/// the write half of that session's outbound frame channel.
pub type ClientMap = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>;

/// Shared server state.
pub struct GatewayState {
    pub relay: Arc<Relay>,
    pub log: Arc<dyn ConversationLog>,
    pub clients: ClientMap,
    secure_token: Secret<String>,
    bot_token: Secret<String>,
}

impl GatewayState {
    pub fn new(
        relay: Arc<Relay>,
        log: Arc<dyn ConversationLog>,
        clients: ClientMap,
        secure_token: Secret<String>,
        bot_token: Secret<String>,
    ) -> Self {
        Self {
            relay,
            log,
            clients,
            secure_token,
            bot_token,
        }
    }

    /// Dashboard shared-secret check. Empty candidates never match.
    pub fn secure_token_matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate == self.secure_token.expose_secret()
    }

    /// The webhook path segment must equal the bot token.
    pub fn webhook_token_matches(&self, candidate: &str) -> bool {
        !candidate.is_empty() && candidate == self.bot_token.expose_secret()
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn register_client(&self, conn_id: &str, tx: mpsc::UnboundedSender<String>) {
        self.clients.write().await.insert(conn_id.to_string(), tx);
    }

    pub async fn remove_client(&self, conn_id: &str) {
        self.clients.write().await.remove(conn_id);
    }
}
