use async_trait::async_trait;

use crate::log::StoredMessage;

/// Sink for newly stored messages — the gateway provides the concrete
/// implementation that fans out to connected dashboard sessions.
#[async_trait]
pub trait MessageBroadcast: Send + Sync {
    /// Push a stored message to all connected dashboard viewers.
    async fn broadcast_new_message(&self, message: &StoredMessage);
}
