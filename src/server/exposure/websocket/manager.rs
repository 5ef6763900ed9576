//! Connection manager for WebSocket clients
//!
//! The `ConnectionManager` tracks every live connection and the tenant rooms
//! it has joined. When a payment event arrives from the `EventBus`, it is
//! forwarded to the connections in that tenant's room only.
//!
//! # Architecture
//!
//! ```text
//! EventBus ──recv──▶ ConnectionManager::run_dispatch_loop()
//!                          │
//!                    event.tenant_id()
//!                          │
//!                    connections whose rooms contain it
//!                          │
//!                    ──▶ send to client via mpsc channel
//! ```
//!
//! Rooms live only in memory and are lost on restart.

use super::protocol::ServerMessage;
use crate::core::events::{EventEnvelope, PortalEvent};
use std::collections::{HashMap, HashSet};
use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

/// A handle to a single WebSocket connection
struct ConnectionHandle {
    /// Sender to push ServerMessage to the client's write loop
    tx: mpsc::UnboundedSender<ServerMessage>,
    /// Tenant rooms this connection has joined
    tenants: HashSet<Uuid>,
}

/// Manages all active WebSocket connections and their tenant rooms
///
/// Reads (dispatch) are frequent, writes (connect/disconnect/register) are
/// infrequent.
pub struct ConnectionManager {
    connections: RwLock<HashMap<String, ConnectionHandle>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new WebSocket connection
    ///
    /// Returns a tuple of (connection_id, receiver) where the receiver
    /// will receive `ServerMessage`s to forward to the client.
    pub async fn connect(&self) -> (String, mpsc::UnboundedReceiver<ServerMessage>) {
        let connection_id = format!("conn_{}", Uuid::new_v4().simple());
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = ConnectionHandle {
            tx,
            tenants: HashSet::new(),
        };

        self.connections
            .write()
            .await
            .insert(connection_id.clone(), handle);

        tracing::debug!(connection_id = %connection_id, "WebSocket client connected");

        (connection_id, rx)
    }

    /// Remove a connection and every room membership it held
    pub async fn disconnect(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);
        tracing::debug!(connection_id = %connection_id, "WebSocket client disconnected");
    }

    /// Join a tenant's private room
    pub async fn register_tenant(
        &self,
        connection_id: &str,
        tenant_id: Uuid,
    ) -> Result<(), String> {
        let mut connections = self.connections.write().await;
        let conn = connections
            .get_mut(connection_id)
            .ok_or_else(|| format!("Connection {} not found", connection_id))?;

        conn.tenants.insert(tenant_id);

        tracing::debug!(
            connection_id = %connection_id,
            tenant_id = %tenant_id,
            "Tenant registered"
        );

        Ok(())
    }

    /// Leave a tenant's private room
    ///
    /// Returns `true` if the connection was in the room.
    pub async fn unregister_tenant(
        &self,
        connection_id: &str,
        tenant_id: Uuid,
    ) -> Result<bool, String> {
        let mut connections = self.connections.write().await;
        let conn = connections
            .get_mut(connection_id)
            .ok_or_else(|| format!("Connection {} not found", connection_id))?;

        let removed = conn.tenants.remove(&tenant_id);
        if removed {
            tracing::debug!(
                connection_id = %connection_id,
                tenant_id = %tenant_id,
                "Tenant unregistered"
            );
        }

        Ok(removed)
    }

    /// Send a message to a specific connection
    pub async fn send_to(&self, connection_id: &str, message: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(conn) = connections.get(connection_id) {
            // If send fails, the receiver is dropped (client disconnected)
            let _ = conn.tx.send(message);
        }
    }

    /// Forward an event to every connection in the tenant's room
    ///
    /// Returns the number of connections the event was handed to.
    async fn dispatch_event(&self, envelope: &EventEnvelope) -> usize {
        let tenant_id = envelope.event.tenant_id();
        let connections = self.connections.read().await;
        let mut delivered = 0;

        for (connection_id, handle) in connections.iter() {
            if !handle.tenants.contains(&tenant_id) {
                continue;
            }

            let message = match &envelope.event {
                PortalEvent::PaymentApproved { payment, .. } => {
                    ServerMessage::PaymentApproved(payment.clone())
                }
            };

            if handle.tx.send(message).is_err() {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Failed to send event to connection (likely disconnected)"
                );
            } else {
                delivered += 1;
            }
        }

        if delivered == 0 {
            tracing::debug!(
                tenant_id = %tenant_id,
                event = envelope.event.event_kind(),
                "No connection registered for tenant, event dropped"
            );
        }

        delivered
    }

    /// Run the event dispatch loop
    ///
    /// Receives events from the `EventBus` broadcast channel until the bus
    /// is dropped. Should be spawned as a background task.
    pub async fn run_dispatch_loop(&self, mut rx: broadcast::Receiver<EventEnvelope>) {
        tracing::info!("WebSocket dispatch loop started");

        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    self.dispatch_event(&envelope).await;
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    tracing::warn!(count, "WebSocket dispatch loop lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("EventBus closed, stopping WebSocket dispatch loop");
                    break;
                }
            }
        }
    }

    /// Get the number of active connections (for monitoring)
    #[allow(dead_code)]
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
