//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and runs one page per connection:
//! browser events flow into the page, display patches and redirects flow
//! back out.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::hub::SessionHub;
use super::messages::{ClientMessage, ServerMessage};
use crate::api::{ApiError, AppState};
use crate::page::{Page, PageEvent, PageKind};

/// Query parameters of the upgrade request
#[derive(Debug, Deserialize)]
pub struct SessionParams {
    /// `dashboard` or `login`
    pub page: String,
    /// Browser location path, used for nav highlighting
    #[serde(default)]
    pub path: Option<String>,
    /// Initial viewport width
    #[serde(default)]
    pub width: Option<u32>,
}

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<SessionParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let kind = match params.page.parse::<PageKind>() {
        Ok(kind) => kind,
        Err(e) => return ApiError::Validation(e).into_response(),
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, kind, params))
}

fn encode(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, kind: PageKind, params: SessionParams) {
    let (mut sender, mut receiver) = socket.split();
    let hub = Arc::clone(&state.hub);

    // Outbound channel shared by the hub, the page display and the navigator
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let session_id = match hub.register(tx.clone(), kind).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Failed to register WebSocket session");
            if let Some(msg) = encode(&ServerMessage::Error {
                message: e.to_string(),
            }) {
                let _ = sender.send(msg).await;
            }
            return;
        }
    };

    let connected = ServerMessage::Connected {
        session_id: session_id.clone(),
        page: kind,
    };
    let sent = match encode(&connected) {
        Some(msg) => sender.send(msg).await.is_ok(),
        None => false,
    };
    if !sent {
        tracing::error!(session_id = %session_id, "Failed to send connected message");
        hub.unregister(&session_id).await;
        return;
    }

    let mut ctx = state
        .page_context(kind, tx)
        .with_path(params.path.unwrap_or_default());
    if let Some(width) = params.width {
        ctx = ctx.with_viewport_width(width);
    }
    let page = Page::boot(kind, ctx);

    let (events_tx, events_rx) = mpsc::unbounded_channel::<PageEvent>();
    let mut page_task = tokio::spawn(page.run(events_rx));

    let send_id = session_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = encode(&msg) else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                tracing::debug!(session_id = %send_id, "WebSocket send failed, closing session");
                break;
            }
        }
    });

    let recv_hub = Arc::clone(&hub);
    let recv_id = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&recv_hub, &recv_id, &events_tx, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(session_id = %recv_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {}
        _ = &mut recv_task => {}
        _ = &mut page_task => {}
    }
    send_task.abort();
    recv_task.abort();
    page_task.abort();

    hub.unregister(&session_id).await;
}

/// Handle a received WebSocket message
///
/// Returns false if the session should be closed.
async fn handle_ws_message(
    hub: &SessionHub,
    session_id: &str,
    events: &mpsc::UnboundedSender<PageEvent>,
    message: Message,
) -> bool {
    match message {
        Message::Text(text) => {
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Event { event }) => {
                    tracing::trace!(session_id = %session_id, event = ?event, "Page event");
                    if events.send(event).is_err() {
                        return false;
                    }
                }
                Ok(ClientMessage::Ping) => {
                    let _ = hub.send_to(session_id, ServerMessage::Pong).await;
                }
                Err(e) => {
                    tracing::debug!(
                        session_id = %session_id,
                        error = %e,
                        text = %text,
                        "Invalid client message"
                    );
                    // Keep the session open
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = hub.send_to(session_id, error_msg).await;
                }
            }
            true
        }
        Message::Binary(_) => {
            let error_msg = ServerMessage::Error {
                message: "Binary messages not supported".to_string(),
            };
            let _ = hub.send_to(session_id, error_msg).await;
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(session_id = %session_id, "Client requested close");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::HubConfig;

    async fn session() -> (
        SessionHub,
        String,
        mpsc::UnboundedReceiver<ServerMessage>,
        mpsc::UnboundedSender<PageEvent>,
        mpsc::UnboundedReceiver<PageEvent>,
    ) {
        let hub = SessionHub::new(HubConfig::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let id = hub.register(tx, PageKind::Dashboard).await.unwrap();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        (hub, id, rx, events_tx, events_rx)
    }

    #[tokio::test]
    async fn test_event_forwarded_to_page() {
        let (hub, id, _out, events_tx, mut events_rx) = session().await;
        let text = r#"{"type":"event","event":{"kind":"click","target":"sidebarToggle"}}"#;

        assert!(handle_ws_message(&hub, &id, &events_tx, Message::Text(text.to_string())).await);
        assert_eq!(events_rx.try_recv().unwrap(), PageEvent::click("sidebarToggle"));
    }

    #[tokio::test]
    async fn test_ping_and_invalid_messages() {
        let (hub, id, mut out, events_tx, _events_rx) = session().await;

        assert!(
            handle_ws_message(&hub, &id, &events_tx, Message::Text(r#"{"type":"ping"}"#.into()))
                .await
        );
        assert_eq!(out.try_recv().unwrap(), ServerMessage::Pong);

        assert!(handle_ws_message(&hub, &id, &events_tx, Message::Text("nope".into())).await);
        assert!(matches!(out.try_recv().unwrap(), ServerMessage::Error { .. }));

        assert!(!handle_ws_message(&hub, &id, &events_tx, Message::Close(None)).await);
    }
}
