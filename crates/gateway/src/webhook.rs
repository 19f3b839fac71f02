use std::sync::Arc;

use {
    axum::{
        Json,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    },
    teloxide::types::Update,
    tracing::{debug, warn},
};

use relaydesk_telegram::classify_update;

use crate::state::GatewayState;

/// Inbound webhook from the chat platform.
///
/// The path token keeps the endpoint unguessable; a mismatch is the only
/// non-ack outcome. Everything else — parse failures included — is
/// acknowledged with a fixed body, since the platform treats a non-ack
/// as "retry delivery" and duplicate relays are worse than a dropped
/// log entry.
pub async fn webhook_handler(
    Path(token): Path<String>,
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if !state.webhook_token_matches(&token) {
        warn!("webhook called with unknown token");
        return StatusCode::NOT_FOUND.into_response();
    }

    debug!(payload = %body, "webhook received update");

    match serde_json::from_value::<Update>(body) {
        Ok(update) => {
            let forward_to_id = state.relay.forward_to_id().to_string();
            if let Some(event) = classify_update(&update, &forward_to_id) {
                state.relay.handle_event(event).await;
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to parse webhook update");
        },
    }

    Json(serde_json::json!({ "status": "ok" })).into_response()
}
