//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with health checks,
//! the `/api` routes and any custom routes.

use super::super::host::ServerHost;
use crate::server::router::build_api_routes;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// `custom_routes` are merged after the API routes and share the host
    /// as state.
    pub fn build_router(
        host: Arc<ServerHost>,
        custom_routes: Vec<Router<Arc<ServerHost>>>,
    ) -> Result<Router> {
        let mut app = Self::health_routes().merge(build_api_routes());

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app.with_state(host))
    }

    fn health_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "tenant-portal"
        }))
    }
}
