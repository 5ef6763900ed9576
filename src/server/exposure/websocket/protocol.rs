//! WebSocket message protocol definitions
//!
//! Every frame is a JSON text frame of the form `{"event": <name>, "data": <payload>}`.
//!
//! ## Client → Server Messages
//!
//! ```json
//! // Join a tenant's private room
//! {"event": "registerTenant", "data": "6f1c3a5e-..."}
//!
//! // Leave it again
//! {"event": "unregisterTenant", "data": "6f1c3a5e-..."}
//!
//! // Keepalive
//! {"event": "ping"}
//! ```
//!
//! ## Server → Client Messages
//!
//! ```json
//! {"event": "welcome", "data": {"connectionId": "conn_..."}}
//! {"event": "registered", "data": {"tenantId": "6f1c3a5e-..."}}
//! {"event": "unregistered", "data": {"tenantId": "6f1c3a5e-..."}}
//! {"event": "paymentApproved", "data": {"id": "...", "status": "successful", ...}}
//! {"event": "pong"}
//! {"event": "error", "data": {"message": "Invalid message: ..."}}
//! ```

use crate::payments::PaymentView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the private room of a tenant
    RegisterTenant(Uuid),
    /// Leave the private room of a tenant
    UnregisterTenant(Uuid),
    /// Keepalive ping
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent once, right after the upgrade
    Welcome { connection_id: String },
    /// Room joined
    Registered { tenant_id: Uuid },
    /// Room left
    Unregistered { tenant_id: Uuid },
    /// A payment of the room's tenant became successful
    PaymentApproved(PaymentView),
    /// Keepalive response
    Pong,
    /// Error message
    Error { message: String },
}
