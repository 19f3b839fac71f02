use async_trait::async_trait;

use crate::Result;

/// A persisted conversation message. Immutable once stored.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredMessage {
    /// Monotonic surrogate key assigned by the store.
    pub id: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    /// Write-time instant, epoch milliseconds UTC.
    pub created_at: i64,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
}

/// A message about to be persisted. Id and timestamp are assigned by the
/// store at append time.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
}

impl NewMessage {
    /// A plain text message with no media fields.
    pub fn text(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            body: body.into(),
            media_type: None,
            media_url: None,
        }
    }

    /// A photo message with its resolved URL.
    pub fn photo(
        sender_id: impl Into<String>,
        sender_name: impl Into<String>,
        body: impl Into<String>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            sender_id: sender_id.into(),
            sender_name: sender_name.into(),
            body: body.into(),
            media_type: Some("photo".into()),
            media_url: Some(media_url.into()),
        }
    }
}

/// Persistent append-only conversation log plus per-user auto-reply
/// bookkeeping. Writes are durable before the call returns.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Append a message, assigning id and timestamp. Returns the stored
    /// record.
    async fn append(&self, message: NewMessage) -> Result<StoredMessage>;

    /// The most recent messages, oldest-first. Capped at a bounded window
    /// to protect dashboard render cost.
    async fn recent(&self, limit: u32) -> Result<Vec<StoredMessage>>;

    /// Last auto-reply instant for a user. `None` when no record exists;
    /// `Some(None)` when the record exists but has never fired.
    async fn auto_reply_last(&self, user_id: &str) -> Result<Option<Option<i64>>>;

    /// Create or update the user's auto-reply timestamp.
    async fn set_auto_reply(&self, user_id: &str, at_ms: i64) -> Result<()>;
}
