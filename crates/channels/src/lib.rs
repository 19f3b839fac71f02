//! Platform-neutral seams between the relay core and its collaborators:
//! the outbound chat client, the inbound event model, the conversation
//! log, and the dashboard broadcast sink.

pub mod broadcast;
pub mod error;
pub mod event;
pub mod log;
pub mod outbound;

pub use {
    broadcast::MessageBroadcast,
    error::{Error, Result},
    event::{InboundEvent, ReplyContent},
    log::{ConversationLog, NewMessage, StoredMessage},
    outbound::ChannelOutbound,
};
