use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        payloads::SendPhotoSetters,
        prelude::*,
        types::{ChatId, InputFile},
    },
    tracing::info,
};

use relaydesk_channels::{ChannelOutbound, Error, Result};

/// Outbound message sender backed by the Telegram Bot API.
///
/// Each operation issues one request; failures surface as
/// [`Error::Channel`] and are never retried here — the caller decides
/// whether to surface or suppress.
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(token: &Secret<String>) -> anyhow::Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            bot: Bot::with_client(token.expose_secret(), client),
        })
    }

    fn chat_id(to: &str) -> Result<ChatId> {
        Ok(ChatId(to.parse::<i64>()?))
    }
}

#[async_trait]
impl ChannelOutbound for TelegramOutbound {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        let chat_id = Self::chat_id(to)?;
        self.bot
            .send_message(chat_id, text)
            .await
            .map_err(|e| Error::channel("send text", e))?;
        info!(chat_id = to, text_len = text.len(), "telegram text sent");
        Ok(())
    }

    async fn send_photo(&self, to: &str, file_id: &str, caption: &str) -> Result<()> {
        let chat_id = Self::chat_id(to)?;
        self.bot
            .send_photo(chat_id, InputFile::file_id(file_id))
            .caption(caption)
            .await
            .map_err(|e| Error::channel("send photo", e))?;
        info!(chat_id = to, file_id, "telegram photo sent");
        Ok(())
    }

    async fn resolve_file(&self, file_id: &str) -> Result<String> {
        let file = self
            .bot
            .get_file(file_id)
            .await
            .map_err(|e| Error::channel("get file info", e))?;

        // Telegram file URL format: https://api.telegram.org/file/bot<token>/<file_path>
        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        ))
    }
}
