//! Telegram bindings: the outbound Bot API client and webhook update
//! classification.

pub mod inbound;
pub mod outbound;

pub use {inbound::classify_update, outbound::TelegramOutbound};
