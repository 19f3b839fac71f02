use std::error::Error as StdError;

/// Crate-wide result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared across the relay seams.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An outbound send or file fetch against the chat platform failed.
    #[error("channel operation failed: {context}: {source}")]
    Channel {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// An operator reply could not be mapped back to a user.
    #[error("reply correlation failed: {reason}")]
    Correlation { reason: String },

    /// Input payload or parameter is invalid.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A persistence operation failed.
    #[error("store operation failed: {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// Integer parsing failed (chat ids on the wire are strings).
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),
}

impl Error {
    #[must_use]
    pub fn channel(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Channel {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn correlation(reason: impl std::fmt::Display) -> Self {
        Self::Correlation {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn store(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
