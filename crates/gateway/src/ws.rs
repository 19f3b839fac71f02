use std::sync::Arc;

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, stream::StreamExt},
    serde::{Deserialize, Serialize},
    tokio::sync::mpsc,
    tracing::{debug, info, warn},
};

use relaydesk_channels::Error;

use crate::state::GatewayState;

/// Client → server frames on the dashboard socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
enum ClientFrame {
    SendMessage(SendMessagePayload),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SendMessagePayload {
    secure_token: String,
    sender_id: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct ErrorFrame<'a> {
    event: &'static str,
    data: ErrorPayload<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

fn error_frame(message: &str) -> String {
    serde_json::to_string(&ErrorFrame {
        event: "error",
        data: ErrorPayload { error: message },
    })
    .unwrap_or_else(|_| r#"{"event":"error","data":{"error":"internal"}}"#.to_string())
}

/// Validate a dashboard send against the shared secret and required
/// fields. The rejection message goes to the originating session only.
fn validate_send(
    payload: &SendMessagePayload,
    state: &GatewayState,
) -> relaydesk_channels::Result<()> {
    if !state.secure_token_matches(&payload.secure_token) {
        return Err(Error::invalid_input("Invalid secure_token"));
    }
    if payload.sender_id.is_empty() || payload.text.is_empty() {
        return Err(Error::invalid_input("Missing required fields"));
    }
    Ok(())
}

/// Handle one dashboard WebSocket connection: register its write channel,
/// process `send_message` frames until the socket closes, then clean up.
pub async fn handle_connection(socket: WebSocket, state: Arc<GatewayState>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %conn_id, "ws: dashboard session connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();

    // Write loop: forwards frames from the channel to the socket.
    let write_conn_id = conn_id.clone();
    let write_handle = tokio::spawn(async move {
        while let Some(msg) = client_rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                debug!(conn_id = %write_conn_id, "ws: write loop closed");
                break;
            }
        }
    });

    state.register_client(&conn_id, client_tx.clone()).await;

    while let Some(Ok(msg)) = ws_rx.next().await {
        let Message::Text(text) = msg else {
            continue;
        };

        let frame = match serde_json::from_str::<ClientFrame>(&text) {
            Ok(f) => f,
            Err(e) => {
                debug!(conn_id = %conn_id, error = %e, "ws: unrecognized frame");
                let _ = client_tx.send(error_frame("Unrecognized frame"));
                continue;
            },
        };

        match frame {
            ClientFrame::SendMessage(payload) => {
                if let Err(e) = validate_send(&payload, &state) {
                    warn!(conn_id = %conn_id, error = %e, "ws: rejected dashboard send");
                    // Error goes to this session only — no broadcast, no
                    // store write.
                    let reason = match e {
                        Error::InvalidInput { message } => message,
                        other => other.to_string(),
                    };
                    let _ = client_tx.send(error_frame(&reason));
                    continue;
                }

                if let Err(e) = state
                    .relay
                    .send_operator_message(&payload.sender_id, &payload.text)
                    .await
                {
                    warn!(conn_id = %conn_id, error = %e, "ws: dashboard send failed");
                    let _ = client_tx.send(error_frame("Failed to send message"));
                }
            },
        }
    }

    state.remove_client(&conn_id).await;
    write_handle.abort();
    info!(conn_id = %conn_id, "ws: dashboard session closed");
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use {
        relaydesk_channels::{ChannelOutbound, MessageBroadcast, log::ConversationLog},
        relaydesk_relay::{Relay, RelaySettings},
        relaydesk_store::SqliteConversationLog,
        secrecy::Secret,
        sqlx::SqlitePool,
        tokio::sync::RwLock,
    };

    use {super::*, crate::broadcast::GatewayBroadcaster, crate::state::ClientMap};

    struct NullOutbound;

    #[async_trait::async_trait]
    impl ChannelOutbound for NullOutbound {
        async fn send_text(&self, _to: &str, _text: &str) -> relaydesk_channels::Result<()> {
            Ok(())
        }
        async fn send_photo(
            &self,
            _to: &str,
            _file_id: &str,
            _caption: &str,
        ) -> relaydesk_channels::Result<()> {
            Ok(())
        }
        async fn resolve_file(&self, file_id: &str) -> relaydesk_channels::Result<String> {
            Ok(format!("https://files.example/{file_id}"))
        }
    }

    async fn test_state() -> GatewayState {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteConversationLog::init(&pool).await.unwrap();
        let log: Arc<dyn ConversationLog> = Arc::new(SqliteConversationLog::new(pool));
        let clients: ClientMap = Arc::new(RwLock::new(HashMap::new()));
        let broadcast: Arc<dyn MessageBroadcast> =
            Arc::new(GatewayBroadcaster::new(Arc::clone(&clients)));
        let relay = Arc::new(Relay::new(
            Arc::clone(&log),
            Arc::new(NullOutbound),
            broadcast,
            RelaySettings {
                forward_to_id: "777".into(),
                welcome_message: "welcome".into(),
                bot_id: "42".into(),
                cooldown_hours: 24,
            },
        ));
        GatewayState::new(
            relay,
            log,
            clients,
            Secret::new("good-token".into()),
            Secret::new("1:A".into()),
        )
    }

    fn payload(token: &str, sender_id: &str, text: &str) -> SendMessagePayload {
        SendMessagePayload {
            secure_token: token.into(),
            sender_id: sender_id.into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn valid_send_passes() {
        let state = test_state().await;
        assert!(validate_send(&payload("good-token", "111", "hi"), &state).is_ok());
    }

    fn rejection(result: relaydesk_channels::Result<()>) -> String {
        match result.unwrap_err() {
            Error::InvalidInput { message } => message,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let state = test_state().await;
        assert_eq!(
            rejection(validate_send(&payload("bad", "111", "hi"), &state)),
            "Invalid secure_token"
        );
        assert_eq!(
            rejection(validate_send(&payload("", "111", "hi"), &state)),
            "Invalid secure_token"
        );
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let state = test_state().await;
        assert_eq!(
            rejection(validate_send(&payload("good-token", "", "hi"), &state)),
            "Missing required fields"
        );
        assert_eq!(
            rejection(validate_send(&payload("good-token", "111", ""), &state)),
            "Missing required fields"
        );
    }

    #[tokio::test]
    async fn rejected_send_writes_nothing() {
        let state = test_state().await;
        let p = payload("bad", "111", "hi");
        assert!(validate_send(&p, &state).is_err());
        // Validation happens before any relay call; the log stays empty.
        assert!(state.log.recent(10).await.unwrap().is_empty());
    }

    #[test]
    fn client_frame_parses_send_message() {
        let json = r#"{"event":"send_message","data":{"secure_token":"t","sender_id":"1","text":"x"}}"#;
        let frame: ClientFrame = serde_json::from_str(json).unwrap();
        let ClientFrame::SendMessage(p) = frame;
        assert_eq!(p.sender_id, "1");
    }
}
