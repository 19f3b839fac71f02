//! Gateway: the HTTP + WebSocket server in front of the relay.
//!
//! Lifecycle:
//! 1. Load + validate config
//! 2. Open the store, build the relay
//! 3. Start the HTTP server (health, dashboard window, webhook)
//! 4. Attach the WebSocket upgrade handler for live dashboard sessions
//!
//! Relay semantics live in `relaydesk-relay`; this crate only moves
//! bytes in and out.

pub mod broadcast;
pub mod server;
pub mod state;
pub mod time;
pub mod webhook;
pub mod ws;

pub use {
    broadcast::GatewayBroadcaster,
    server::{build_app, start_server},
    state::GatewayState,
};
