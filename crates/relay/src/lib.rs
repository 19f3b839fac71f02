//! The relay core — the glue between inbound platform events and the
//! store, outbound client, and dashboard broadcast.
//!
//! Flow: webhook update → classify event → orchestrator branch (store,
//! forward, broadcast) → auto-reply check for end users.

pub mod correlate;
pub mod gate;
pub mod handlers;

pub use {
    gate::AutoReplyGate,
    handlers::{Relay, RelaySettings},
};
