//! Authorization system for the portal
//!
//! Callers are identified by an HS256 bearer token. The [`AuthProvider`] turns
//! request headers into an [`AuthContext`], and handlers state what they
//! require through an [`AuthPolicy`].

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{PortalResult, RequestError};
use crate::entities::Role;

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated tenant
    Tenant { user_id: Uuid },

    /// Authenticated administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Build a context from a verified role
    pub fn from_role(user_id: Uuid, role: Role) -> Self {
        match role {
            Role::Admin => AuthContext::Admin { admin_id: user_id },
            Role::Tenant => AuthContext::Tenant { user_id },
        }
    }

    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    /// Check if context carries any identity
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    /// Get the caller's user id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::Tenant { user_id } => Some(*user_id),
            AuthContext::Admin { admin_id } => Some(*admin_id),
            AuthContext::Anonymous => None,
        }
    }

    /// Get the caller's user id or fail with 401
    pub fn require_user(&self) -> PortalResult<Uuid> {
        self.user_id().ok_or_else(|| {
            RequestError::Unauthorized {
                message: "Authentication required".to_string(),
            }
            .into()
        })
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated user
    Authenticated,

    /// Admin only
    AdminOnly,

    /// The caller is the given user
    Owner(Uuid),

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),
}

impl AuthPolicy {
    /// The given user or any admin
    pub fn owner_or_admin(owner: Uuid) -> Self {
        AuthPolicy::Or(vec![AuthPolicy::Owner(owner), AuthPolicy::AdminOnly])
    }

    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => context.is_authenticated(),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::Owner(owner) => context.user_id() == Some(*owner),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),
        }
    }

    /// Check the policy and turn a refusal into 401 (anonymous) or 403
    pub fn enforce(&self, context: &AuthContext) -> PortalResult<()> {
        if self.check(context) {
            return Ok(());
        }
        if context.is_authenticated() {
            Err(RequestError::Forbidden {
                message: "Access denied".to_string(),
            }
            .into())
        } else {
            Err(RequestError::Unauthorized {
                message: "Authentication required".to_string(),
            }
            .into())
        }
    }
}

// =============================================================================
// Tokens
// =============================================================================

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    #[default]
    Login,
    Reset,
}

/// JWT claims carried by portal tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub purpose: TokenPurpose,
}

/// Errors raised while issuing or verifying tokens
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token is not valid for {expected:?}")]
    WrongPurpose { expected: TokenPurpose },
}

impl From<TokenError> for crate::core::error::PortalError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => crate::core::error::PortalError::Internal(e.to_string()),
            other => RequestError::Unauthorized {
                message: other.to_string(),
            }
            .into(),
        }
    }
}

/// Issues and verifies HS256 tokens
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    login_ttl: Duration,
    reset_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("login_ttl", &self.login_ttl)
            .field("reset_ttl", &self.reset_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from a shared secret
    pub fn new(secret: &str, login_ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            login_ttl: Duration::hours(login_ttl_hours),
            reset_ttl: Duration::hours(1),
        }
    }

    /// Issue a login token
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String, TokenError> {
        self.sign(user_id, role, TokenPurpose::Login, self.login_ttl)
    }

    /// Issue a one-hour password reset token
    pub fn issue_reset(&self, user_id: Uuid, role: Role) -> Result<String, TokenError> {
        self.sign(user_id, role, TokenPurpose::Reset, self.reset_ttl)
    }

    /// Verify a token and check its purpose
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(TokenError::Invalid)?;

        if data.claims.purpose != expected {
            return Err(TokenError::WrongPurpose { expected });
        }
        Ok(data.claims)
    }

    fn sign(
        &self,
        user_id: Uuid,
        role: Role,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            purpose,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from HTTP request headers
    ///
    /// A missing `Authorization` header yields [`AuthContext::Anonymous`];
    /// a present but invalid one is an error.
    async fn extract_context(&self, headers: &HeaderMap) -> PortalResult<AuthContext>;
}

/// Bearer-token provider backed by [`TokenService`]
pub struct JwtAuthProvider {
    tokens: Arc<TokenService>,
}

impl JwtAuthProvider {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl AuthProvider for JwtAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> PortalResult<AuthContext> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(AuthContext::Anonymous);
        };

        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RequestError::Unauthorized {
                message: "Malformed Authorization header".to_string(),
            })?;

        let claims = self.tokens.verify(token, TokenPurpose::Login)?;
        Ok(AuthContext::from_role(claims.sub, claims.role))
    }
}

/// Provider that treats every caller as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> PortalResult<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}
