//! WebSocket exposure: the tenant notification channel
//!
//! # Architecture
//!
//! ```text
//! Client ──ws──▶ /ws ──▶ ws_handler() ──▶ ConnectionManager
//!                                              │
//!                                   registerTenant(tenantId)
//!                                              │
//!                 EventBus ──broadcast──▶ tenant room ──▶ Client
//! ```
//!
//! Registration is advisory: a client names the tenant it listens for and no
//! credential is checked. See [`protocol`] for the frame format.

mod handler;
mod manager;
pub mod protocol;

use crate::server::host::ServerHost;
use anyhow::Result;
use axum::{Router, routing::get};
use std::sync::Arc;

pub use manager::ConnectionManager;

/// WebSocket API exposure
///
/// Consumes a `ServerHost` and produces a router with the `/ws` endpoint.
/// Each call owns its own [`ConnectionManager`]; there is no process-wide
/// room registry.
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerBuilder::new().with_config(config).build_host()?);
///
/// let rest_router = RestExposure::build_router(host.clone())?;
/// let ws_router = WebSocketExposure::build_router(host)?;
///
/// let app = rest_router.merge(ws_router);
/// ```
pub struct WebSocketExposure;

impl WebSocketExposure {
    /// Build the WebSocket router from a host
    ///
    /// Subscribes a new `ConnectionManager` to the host's `EventBus` and
    /// spawns its dispatch loop; must be called inside a Tokio runtime.
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let connection_manager = Arc::new(ConnectionManager::new());

        if let Some(event_bus) = host.event_bus() {
            let cm = connection_manager.clone();
            let rx = event_bus.subscribe();
            tokio::spawn(async move {
                cm.run_dispatch_loop(rx).await;
            });
        } else {
            tracing::warn!(
                "WebSocketExposure: No EventBus configured on ServerHost. \
                 WebSocket connections will work but no payment notifications will be pushed."
            );
        }

        let router = Router::new()
            .route("/ws", get(handler::ws_handler))
            .with_state(connection_manager);

        Ok(router)
    }
}
