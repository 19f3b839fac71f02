use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
///
/// The relay-facing options are flat, matching the deployed config files;
/// server and database settings live in their own sections.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaydeskConfig {
    /// Bot token from @BotFather.
    #[serde(serialize_with = "serialize_secret")]
    pub bot_token: Secret<String>,

    /// Shared secret for dashboard page loads and dashboard sends.
    #[serde(serialize_with = "serialize_secret")]
    pub secure_token: Secret<String>,

    /// Chat id of the operator who receives all forwarded user messages.
    pub forward_to_id: String,

    /// Automated welcome text sent to users on first contact.
    pub welcome_message: String,

    /// Minimum interval between welcome messages to the same user.
    pub cooldown_hours: u64,

    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

/// SQLite database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for RelaydeskConfig {
    fn default() -> Self {
        Self {
            bot_token: Secret::new(String::new()),
            secure_token: Secret::new(String::new()),
            forward_to_id: String::new(),
            welcome_message: String::new(),
            cooldown_hours: 24,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 15000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "relaydesk.db".into(),
        }
    }
}

impl std::fmt::Debug for RelaydeskConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaydeskConfig")
            .field("bot_token", &"[REDACTED]")
            .field("secure_token", &"[REDACTED]")
            .field("forward_to_id", &self.forward_to_id)
            .field("cooldown_hours", &self.cooldown_hours)
            .finish_non_exhaustive()
    }
}

impl RelaydeskConfig {
    /// The bot's own identifier, derived from the numeric prefix of the
    /// token (`<id>:<secret>`). Used as the sender id on automated
    /// messages so the token itself never reaches the log or dashboard.
    #[must_use]
    pub fn bot_id(&self) -> String {
        let token = self.bot_token.expose_secret();
        token
            .split_once(':')
            .map_or_else(|| token.clone(), |(id, _)| id.to_string())
    }

    /// Check that everything required to serve is present.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bot_token.expose_secret().is_empty() {
            anyhow::bail!("bot_token is required");
        }
        if self.secure_token.expose_secret().is_empty() {
            anyhow::bail!("secure_token is required");
        }
        if self.forward_to_id.is_empty() {
            anyhow::bail!("forward_to_id is required");
        }
        Ok(())
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
