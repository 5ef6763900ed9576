//! WebSocket upgrade handler and message loop
//!
//! Each connection gets:
//!
//! 1. A welcome message with its unique connection ID
//! 2. A read loop that processes client messages (registerTenant, unregisterTenant, ping)
//! 3. A write loop that forwards server messages to the WebSocket

use super::manager::ConnectionManager;
use super::protocol::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::SinkExt;
use futures::stream::StreamExt;
use std::sync::Arc;

/// Axum handler for GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(manager): State<Arc<ConnectionManager>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, manager))
}

/// Handle a single WebSocket connection until the client goes away
async fn handle_socket(socket: WebSocket, manager: Arc<ConnectionManager>) {
    let (conn_id, mut server_rx) = manager.connect().await;

    let (mut ws_write, mut ws_read) = socket.split();

    let welcome = ServerMessage::Welcome {
        connection_id: conn_id.clone(),
    };
    if let Ok(json) = serde_json::to_string(&welcome)
        && ws_write.send(Message::Text(json.into())).await.is_err()
    {
        manager.disconnect(&conn_id).await;
        return;
    }

    let conn_id_write = conn_id.clone();

    let write_handle = tokio::spawn(async move {
        while let Some(msg) = server_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_write.send(Message::Text(json.into())).await.is_err() {
                        tracing::debug!(
                            connection_id = %conn_id_write,
                            "WebSocket write failed, closing"
                        );
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        connection_id = %conn_id_write,
                        error = %e,
                        "Failed to serialize ServerMessage"
                    );
                }
            }
        }
    });

    while let Some(result) = ws_read.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_client_message(&manager, &conn_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(connection_id = %conn_id, "Client sent close frame");
                break;
            }
            Ok(_) => {
                // pings are answered by axum, binary frames are ignored
            }
            Err(e) => {
                tracing::debug!(
                    connection_id = %conn_id,
                    error = %e,
                    "WebSocket read error"
                );
                break;
            }
        }
    }

    write_handle.abort();
    manager.disconnect(&conn_id).await;
}

/// Process a single client message
async fn handle_client_message(manager: &ConnectionManager, connection_id: &str, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(msg) => msg,
        Err(e) => {
            let error_msg = ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            };
            manager.send_to(connection_id, error_msg).await;
            return;
        }
    };

    let reply = match msg {
        ClientMessage::RegisterTenant(tenant_id) => {
            match manager.register_tenant(connection_id, tenant_id).await {
                Ok(()) => ServerMessage::Registered { tenant_id },
                Err(message) => ServerMessage::Error { message },
            }
        }
        ClientMessage::UnregisterTenant(tenant_id) => {
            match manager.unregister_tenant(connection_id, tenant_id).await {
                Ok(true) => ServerMessage::Unregistered { tenant_id },
                Ok(false) => ServerMessage::Error {
                    message: format!("Tenant {} is not registered on this connection", tenant_id),
                },
                Err(message) => ServerMessage::Error { message },
            }
        }
        ClientMessage::Ping => ServerMessage::Pong,
    };

    manager.send_to(connection_id, reply).await;
}
