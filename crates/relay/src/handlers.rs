use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::{info, warn};

use relaydesk_channels::{
    ChannelOutbound, InboundEvent, MessageBroadcast, ReplyContent, Result,
    log::{ConversationLog, NewMessage},
};

use crate::{correlate, gate::AutoReplyGate};

/// Immutable relay settings, taken from the loaded configuration.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Chat id of the operator who receives all forwarded messages.
    pub forward_to_id: String,
    /// Automated welcome text.
    pub welcome_message: String,
    /// The bot's own sender id for automated messages.
    pub bot_id: String,
    pub cooldown_hours: u64,
}

/// The message relay orchestrator.
///
/// Each inbound event is processed to completion: channel call, store
/// write, broadcast. A branch that fails partway is logged and considered
/// terminally handled — no retry, no rollback of the partial side effect.
pub struct Relay {
    log: Arc<dyn ConversationLog>,
    outbound: Arc<dyn ChannelOutbound>,
    broadcast: Arc<dyn MessageBroadcast>,
    gate: AutoReplyGate,
    settings: RelaySettings,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

impl Relay {
    pub fn new(
        log: Arc<dyn ConversationLog>,
        outbound: Arc<dyn ChannelOutbound>,
        broadcast: Arc<dyn MessageBroadcast>,
        settings: RelaySettings,
    ) -> Self {
        let gate = AutoReplyGate::new(Arc::clone(&log), settings.cooldown_hours);
        Self {
            log,
            outbound,
            broadcast,
            gate,
            settings,
        }
    }

    /// The configured operator identifier.
    #[must_use]
    pub fn forward_to_id(&self) -> &str {
        &self.settings.forward_to_id
    }

    /// Process one classified inbound event. Failures are logged here;
    /// nothing propagates to the webhook endpoint, which always acks.
    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::UserText {
                user_id,
                display_name,
                text,
            } => {
                if let Err(e) = self.relay_user_text(&user_id, &display_name, &text).await {
                    warn!(user_id, error = %e, "failed to relay user text");
                    return;
                }
                self.auto_reply_check(&user_id).await;
            },
            InboundEvent::UserPhoto {
                user_id,
                display_name,
                file_id,
                caption,
            } => {
                if let Err(e) = self
                    .relay_user_photo(&user_id, &display_name, &file_id, &caption)
                    .await
                {
                    warn!(user_id, error = %e, "failed to relay user photo");
                    return;
                }
                self.auto_reply_check(&user_id).await;
            },
            InboundEvent::OperatorReply {
                quoted_text,
                content,
            } => {
                if let Err(e) = self.relay_operator_reply(&quoted_text, content).await {
                    warn!(error = %e, "failed to relay operator reply");
                }
            },
        }
    }

    /// Dashboard path: operator-typed text to an explicit target user.
    /// Same send + store + broadcast sequence as an operator reply, minus
    /// correlation. Errors propagate so the gateway can answer the
    /// originating session.
    pub async fn send_operator_message(&self, target_id: &str, text: &str) -> Result<()> {
        self.outbound.send_text(target_id, text).await?;
        let stored = self
            .log
            .append(NewMessage::text(&self.settings.forward_to_id, "You", text))
            .await?;
        self.broadcast.broadcast_new_message(&stored).await;
        info!(target_id, "operator dashboard message relayed");
        Ok(())
    }

    async fn relay_user_text(&self, user_id: &str, display_name: &str, text: &str) -> Result<()> {
        let stored = self
            .log
            .append(NewMessage::text(user_id, display_name, text))
            .await?;

        let forward = correlate::forward_text(display_name, user_id, text);
        self.outbound
            .send_text(&self.settings.forward_to_id, &forward)
            .await?;

        self.broadcast.broadcast_new_message(&stored).await;
        Ok(())
    }

    async fn relay_user_photo(
        &self,
        user_id: &str,
        display_name: &str,
        file_id: &str,
        caption: &str,
    ) -> Result<()> {
        let url = self.outbound.resolve_file(file_id).await?;

        let forward = correlate::forward_photo_caption(display_name, user_id, caption);
        self.outbound
            .send_photo(&self.settings.forward_to_id, file_id, &forward)
            .await?;

        let stored = self
            .log
            .append(NewMessage::photo(
                user_id,
                display_name,
                photo_body(&url, caption),
                url.clone(),
            ))
            .await?;

        self.broadcast.broadcast_new_message(&stored).await;
        Ok(())
    }

    async fn relay_operator_reply(&self, quoted_text: &str, content: ReplyContent) -> Result<()> {
        let target_id = correlate::extract_target_id(quoted_text)?;
        info!(target_id, "correlated operator reply");

        let stored = match content {
            ReplyContent::Text(text) => {
                self.outbound.send_text(&target_id, &text).await?;
                self.log
                    .append(NewMessage::text(&self.settings.forward_to_id, "You", text))
                    .await?
            },
            ReplyContent::Photo { file_id, caption } => {
                let url = self.outbound.resolve_file(&file_id).await?;
                self.outbound
                    .send_photo(&target_id, &file_id, &caption)
                    .await?;
                self.log
                    .append(NewMessage::photo(
                        &self.settings.forward_to_id,
                        "You",
                        photo_body(&url, &caption),
                        url.clone(),
                    ))
                    .await?
            },
        };

        self.broadcast.broadcast_new_message(&stored).await;
        Ok(())
    }

    /// Run the welcome gate for an end user. The operator never gets a
    /// welcome, even when their own private text takes the user branch.
    async fn auto_reply_check(&self, user_id: &str) {
        if user_id == self.settings.forward_to_id {
            return;
        }
        if let Err(e) = self.maybe_auto_reply(user_id).await {
            warn!(user_id, error = %e, "auto-reply failed");
        }
    }

    async fn maybe_auto_reply(&self, user_id: &str) -> Result<()> {
        let now = now_ms();
        if !self.gate.should_fire(user_id, now).await? {
            return Ok(());
        }

        self.outbound
            .send_text(user_id, &self.settings.welcome_message)
            .await?;
        self.gate.record_fired(user_id, now).await?;

        let stored = self
            .log
            .append(NewMessage::text(
                &self.settings.bot_id,
                "Bot",
                &self.settings.welcome_message,
            ))
            .await?;
        self.broadcast.broadcast_new_message(&stored).await;

        info!(user_id, "sent auto-reply");
        Ok(())
    }
}

/// Synthesized body for a stored photo message, embedding the resolved
/// file URL.
fn photo_body(url: &str, caption: &str) -> String {
    format!("[photo] {url} {caption}")
}
