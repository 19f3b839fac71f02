use std::{collections::HashMap, sync::Arc};

use {
    axum::{
        Router,
        extract::{Query, State, WebSocketUpgrade},
        http::StatusCode,
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    serde::Serialize,
    tower_http::cors::{Any, CorsLayer},
    tracing::{info, warn},
};

use crate::{
    state::GatewayState,
    time::display_timestamp,
    webhook::webhook_handler,
    ws::handle_connection,
};

/// Initial render window for the dashboard.
const DASHBOARD_WINDOW: u32 = 5000;

/// Build the gateway router (shared between production startup and tests).
pub fn build_app(state: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(dashboard_handler))
        .route("/ws", get(ws_upgrade_handler))
        .route("/webhook/{token}", post(webhook_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn start_server(state: Arc<GatewayState>, bind: &str, port: u16) -> anyhow::Result<()> {
    let app = build_app(state);
    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr, "gateway listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    let count = state.client_count().await;
    Json(serde_json::json!({
        "status": "ok",
        "connections": count,
    }))
}

/// One message in the dashboard's initial window.
#[derive(Debug, Serialize)]
struct DisplayMessage {
    id: i64,
    sender_id: String,
    sender_name: String,
    text: String,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_url: Option<String>,
}

/// Dashboard page load: the most recent bounded window of messages,
/// oldest-first, behind the shared secret.
async fn dashboard_handler(
    State(state): State<Arc<GatewayState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let token = params.get("secure_token").map(String::as_str).unwrap_or("");
    if !state.secure_token_matches(token) {
        return (StatusCode::FORBIDDEN, "Forbidden: Invalid secure_token.").into_response();
    }

    match state.log.recent(DASHBOARD_WINDOW).await {
        Ok(messages) => {
            let window: Vec<DisplayMessage> = messages
                .into_iter()
                .map(|m| DisplayMessage {
                    id: m.id,
                    sender_id: m.sender_id,
                    sender_name: m.sender_name,
                    text: m.body,
                    timestamp: display_timestamp(m.created_at),
                    media_type: m.media_type,
                    media_url: m.media_url,
                })
                .collect();
            Json(window).into_response()
        },
        Err(e) => {
            warn!(error = %e, "failed to load dashboard window");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<GatewayState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}
