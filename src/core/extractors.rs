//! Axum extractors for the caller's identity

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

use crate::core::auth::AuthContext;
use crate::core::error::PortalError;
use crate::server::host::ServerHost;

/// Extractor resolving the bearer token into an [`AuthContext`]
///
/// Requests without an `Authorization` header get [`AuthContext::Anonymous`];
/// handlers decide through an `AuthPolicy` whether that is acceptable. An
/// invalid or expired token is rejected with 401 before the handler runs.
///
/// ```rust,ignore
/// async fn list_all(State(host): State<Arc<ServerHost>>, Auth(ctx): Auth) -> PortalResult<Json<Value>> {
///     AuthPolicy::AdminOnly.enforce(&ctx)?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Auth(pub AuthContext);

impl FromRequestParts<Arc<ServerHost>> for Auth {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        host: &Arc<ServerHost>,
    ) -> Result<Self, Self::Rejection> {
        let context = host.auth.extract_context(&parts.headers).await?;
        Ok(Auth(context))
    }
}
