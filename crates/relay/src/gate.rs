use std::sync::Arc;

use relaydesk_channels::{Result, log::ConversationLog};

const MS_PER_HOUR: i64 = 3_600_000;

/// Decides, per user, whether an automatic welcome should fire.
///
/// Fires on first contact, on a record that has never fired, or once the
/// cooldown since the last fire has elapsed. The operator-identifier
/// exclusion is the orchestrator's job, not this gate's.
pub struct AutoReplyGate {
    log: Arc<dyn ConversationLog>,
    cooldown_ms: i64,
}

impl AutoReplyGate {
    pub fn new(log: Arc<dyn ConversationLog>, cooldown_hours: u64) -> Self {
        Self {
            log,
            cooldown_ms: cooldown_hours as i64 * MS_PER_HOUR,
        }
    }

    /// True when a welcome should be sent to this user at `now_ms`.
    pub async fn should_fire(&self, user_id: &str, now_ms: i64) -> Result<bool> {
        Ok(match self.log.auto_reply_last(user_id).await? {
            None => true,
            Some(None) => true,
            Some(Some(last)) => now_ms > last + self.cooldown_ms,
        })
    }

    /// Record a successful welcome send.
    pub async fn record_fired(&self, user_id: &str, now_ms: i64) -> Result<()> {
        self.log.set_auto_reply(user_id, now_ms).await
    }
}

#[cfg(test)]
mod tests {
    use {relaydesk_store::SqliteConversationLog, sqlx::SqlitePool};

    use super::*;

    const COOLDOWN: i64 = 24 * MS_PER_HOUR;
    const T0: i64 = 1_700_000_000_000;

    async fn test_gate() -> AutoReplyGate {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteConversationLog::init(&pool).await.unwrap();
        AutoReplyGate::new(Arc::new(SqliteConversationLog::new(pool)), 24)
    }

    #[tokio::test]
    async fn fires_for_unseen_user() {
        let gate = test_gate().await;
        assert!(gate.should_fire("u-new", T0).await.unwrap());
    }

    #[tokio::test]
    async fn suppressed_within_cooldown() {
        let gate = test_gate().await;
        gate.record_fired("u1", T0).await.unwrap();

        assert!(!gate.should_fire("u1", T0 + COOLDOWN - 1).await.unwrap());
        assert!(!gate.should_fire("u1", T0 + COOLDOWN).await.unwrap());
        assert!(gate.should_fire("u1", T0 + COOLDOWN + 1).await.unwrap());
    }

    #[tokio::test]
    async fn refires_after_refresh_window() {
        let gate = test_gate().await;
        gate.record_fired("u1", T0).await.unwrap();
        gate.record_fired("u1", T0 + COOLDOWN + 10).await.unwrap();

        // The second fire restarts the window.
        assert!(
            !gate
                .should_fire("u1", T0 + COOLDOWN + 20)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn users_are_independent() {
        let gate = test_gate().await;
        gate.record_fired("u1", T0).await.unwrap();
        assert!(gate.should_fire("u2", T0 + 1).await.unwrap());
    }
}
