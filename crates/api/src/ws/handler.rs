use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::state::AppState;
use crate::ws::manager::WsManager;
use crate::ws::protocol::{ClientMessage, ServerMessage};

/// `GET /api/v1/ws`: upgrade and hand the socket to the manager.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// One task per connection reads client frames; a second drains the
/// manager's channel into the socket. Group membership is dropped together
/// with the connection.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let outbound = ws_manager.add(conn_id.clone()).await;
    tracing::info!(%conn_id, "WebSocket connected");

    let (sink, stream) = socket.split();
    let writer = tokio::spawn(forward_outbound(outbound, sink, conn_id.clone()));

    read_inbound(stream, &ws_manager, &conn_id).await;

    ws_manager.remove(&conn_id).await;
    writer.abort();
    tracing::info!(%conn_id, "WebSocket disconnected");
}

async fn forward_outbound(
    mut outbound: UnboundedReceiver<Message>,
    mut sink: SplitSink<WebSocket, Message>,
    conn_id: String,
) {
    while let Some(message) = outbound.recv().await {
        if let Err(e) = sink.send(message).await {
            tracing::debug!(%conn_id, error = %e, "WebSocket write failed");
            return;
        }
    }
}

/// Returns when the client closes or the stream errors.
async fn read_inbound(mut stream: SplitStream<WebSocket>, ws_manager: &WsManager, conn_id: &str) {
    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(conn_id, error = %e, "WebSocket read failed");
                return;
            }
        };
        match message {
            Message::Text(text) => handle_text(ws_manager, conn_id, text.as_str()).await,
            Message::Close(_) => return,
            // Pings are answered by axum; pongs and binary frames carry nothing.
            _ => {}
        }
    }
}

/// Apply one inbound text frame to the sending connection and acknowledge it.
async fn handle_text(ws_manager: &WsManager, conn_id: &str, text: &str) {
    let reply = reply_for(ws_manager, conn_id, text).await;

    match reply.to_ws() {
        Ok(message) => {
            ws_manager.send_to(conn_id, message).await;
        }
        Err(e) => tracing::error!(conn_id, error = %e, "Failed to encode WebSocket reply"),
    }
}

async fn reply_for(ws_manager: &WsManager, conn_id: &str, text: &str) -> ServerMessage {
    match ClientMessage::parse(text) {
        Ok(ClientMessage::JoinGroup { customer_id }) => {
            if ws_manager.join_group(customer_id, conn_id).await {
                ServerMessage::JoinedGroup { customer_id }
            } else {
                tracing::debug!(conn_id, customer_id, "Join refused for unregistered connection");
                ServerMessage::Error {
                    message: format!("connection {conn_id} is not registered"),
                }
            }
        }
        Ok(ClientMessage::LeaveGroup { customer_id }) => {
            ws_manager.leave_group(customer_id, conn_id).await;
            ServerMessage::LeftGroup { customer_id }
        }
        Err(e) => {
            tracing::debug!(conn_id, error = %e, "Unrecognised WebSocket frame");
            ServerMessage::Error {
                message: format!("invalid message: {e}"),
            }
        }
    }
}
