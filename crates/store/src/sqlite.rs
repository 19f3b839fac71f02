use std::time::{SystemTime, UNIX_EPOCH};

use {
    async_trait::async_trait,
    relaydesk_channels::{
        Error, Result,
        log::{ConversationLog, NewMessage, StoredMessage},
    },
    sqlx::SqlitePool,
};

/// Hard cap on the dashboard's initial render window, regardless of the
/// requested limit.
const RECENT_WINDOW_MAX: u32 = 5000;

/// SQLite-backed conversation log.
pub struct SqliteConversationLog {
    pool: SqlitePool,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    sender_id: String,
    sender_name: String,
    body: String,
    created_at: i64,
    media_type: Option<String>,
    media_url: Option<String>,
}

impl From<MessageRow> for StoredMessage {
    fn from(r: MessageRow) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            sender_name: r.sender_name,
            body: r.body,
            created_at: r.created_at,
            media_type: r.media_type,
            media_url: r.media_url,
        }
    }
}

impl SqliteConversationLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema directly.
    ///
    /// Production schema is managed by sqlx migrations; this is retained
    /// for tests that use in-memory databases.
    #[doc(hidden)]
    pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id   TEXT    NOT NULL,
                sender_name TEXT    NOT NULL,
                body        TEXT    NOT NULL,
                created_at  INTEGER NOT NULL,
                media_type  TEXT,
                media_url   TEXT
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS auto_replies (
                user_id       TEXT PRIMARY KEY,
                last_reply_at INTEGER
            )",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ConversationLog for SqliteConversationLog {
    async fn append(&self, message: NewMessage) -> Result<StoredMessage> {
        let created_at = now_ms();
        let result = sqlx::query(
            "INSERT INTO messages (sender_id, sender_name, body, created_at, media_type, media_url)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.body)
        .bind(created_at)
        .bind(&message.media_type)
        .bind(&message.media_url)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("append message", e))?;

        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            body: message.body,
            created_at,
            media_type: message.media_type,
            media_url: message.media_url,
        })
    }

    async fn recent(&self, limit: u32) -> Result<Vec<StoredMessage>> {
        let capped = limit.min(RECENT_WINDOW_MAX);
        let mut rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender_id, sender_name, body, created_at, media_type, media_url
             FROM messages
             ORDER BY id DESC
             LIMIT ?",
        )
        .bind(capped)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::store("list recent messages", e))?;

        // Fetched newest-first; the dashboard renders oldest-first.
        rows.reverse();
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn auto_reply_last(&self, user_id: &str) -> Result<Option<Option<i64>>> {
        let row = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT last_reply_at FROM auto_replies WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::store("read auto-reply record", e))?;
        Ok(row)
    }

    async fn set_auto_reply(&self, user_id: &str, at_ms: i64) -> Result<()> {
        sqlx::query(
            "INSERT INTO auto_replies (user_id, last_reply_at)
             VALUES (?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
               last_reply_at = excluded.last_reply_at",
        )
        .bind(user_id)
        .bind(at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store("upsert auto-reply record", e))?;
        Ok(())
    }
}
