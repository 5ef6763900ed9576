//! Route table of the `/api` surface

use crate::handlers::{accounts, complaints, houses, messages, payments, rentals};
use crate::server::host::ServerHost;
use axum::Router;
use std::sync::Arc;

/// Build the API routes
///
/// - `/api/auth/*` - registration, login, users, password reset
/// - `/api/house/*` - houses
/// - `/api/rental/*` - rentals
/// - `/api/payment/*` - payments and cash approval
/// - `/api/complaints/*` - complaints
/// - `/api/messages/*` - admin messages
pub fn build_api_routes() -> Router<Arc<ServerHost>> {
    let api = Router::new()
        .nest("/auth", accounts::routes())
        .nest("/house", houses::routes())
        .nest("/rental", rentals::routes())
        .nest("/payment", payments::routes())
        .nest("/complaints", complaints::routes())
        .nest("/messages", messages::routes());

    Router::new().nest("/api", api)
}
