use async_trait::async_trait;

use crate::Result;

/// Send messages to the chat platform. One network call per operation,
/// no retries at this layer — failures propagate to the caller.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Send a plain text message to a chat id.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Send a photo by platform file id with a caption.
    async fn send_photo(&self, to: &str, file_id: &str, caption: &str) -> Result<()>;

    /// Resolve a platform file id to a retrievable URL.
    async fn resolve_file(&self, file_id: &str) -> Result<String>;
}
