//! Account registration, login and password recovery

use std::sync::Arc;

use uuid::Uuid;

use crate::core::auth::{TokenPurpose, TokenService};
use crate::core::error::{EntityError, PortalResult, ValidationError};
use crate::core::password::{hash_password, verify_password};
use crate::core::service::DataService;
use crate::core::Entity;
use crate::entities::{Role, User, normalize_email};
use crate::mail::{Mailer, ResetEmail, render_reset_email};

/// Minutes a password reset link stays valid
pub const RESET_LINK_MINUTES: i64 = 60;

/// Fields accepted when registering a tenant
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Fields a user (or an admin) may change on a profile
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_scan: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct AccountService {
    users: Arc<dyn DataService<User>>,
    tokens: Arc<TokenService>,
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
    portal_name: String,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn DataService<User>>,
        tokens: Arc<TokenService>,
        mailer: Arc<dyn Mailer>,
        frontend_url: impl Into<String>,
        portal_name: impl Into<String>,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            frontend_url: frontend_url.into(),
            portal_name: portal_name.into(),
        }
    }

    async fn find_by_email(&self, email: &str) -> PortalResult<Option<User>> {
        let email = normalize_email(email);
        Ok(self.users.search("email", &email).await?.into_iter().next())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> PortalResult<()> {
        if let Some(existing) = self.find_by_email(email).await?
            && Some(existing.id) != except
        {
            return Err(EntityError::AlreadyExists {
                entity_type: "user".to_string(),
                field: "email".to_string(),
                value: normalize_email(email),
            }
            .into());
        }
        Ok(())
    }

    pub async fn register(&self, registration: Registration) -> PortalResult<User> {
        self.create_user(registration, Role::Tenant).await
    }

    async fn create_user(&self, registration: Registration, role: Role) -> PortalResult<User> {
        self.ensure_email_free(&registration.email, None).await?;

        let hash = hash_password(&registration.password)?;
        let user = User::new(
            registration.name.trim().to_string(),
            registration.email,
            registration.phone,
            hash,
            role,
        );
        let user = self.users.create(user).await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "user registered");
        Ok(user)
    }

    /// Check credentials and issue a login token
    pub async fn authenticate(&self, email: &str, password: &str) -> PortalResult<Session> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| EntityError::not_found("user", normalize_email(email)))?;

        if !verify_password(password, &user.password_hash) {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(ValidationError::field("password", "Invalid credentials").into());
        }

        let token = self.tokens.issue(user.id, user.role)?;
        Ok(Session { token, user })
    }

    /// Create the configured administrator unless that email already exists
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> PortalResult<bool> {
        if self.find_by_email(email).await?.is_some() {
            tracing::debug!(email = %normalize_email(email), "admin account already present");
            return Ok(false);
        }

        let admin = self
            .create_user(
                Registration {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: None,
                    password: password.to_string(),
                },
                Role::Admin,
            )
            .await?;
        tracing::info!(user_id = %admin.id, "bootstrap admin created");
        Ok(true)
    }

    pub async fn list(&self) -> PortalResult<Vec<User>> {
        Ok(self.users.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> PortalResult<User> {
        self.users
            .get(&id)
            .await?
            .ok_or_else(|| EntityError::not_found("user", id).into())
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> PortalResult<User> {
        let mut user = self.get(id).await?;

        if let Some(email) = update.email {
            self.ensure_email_free(&email, Some(id)).await?;
            user.email = normalize_email(&email);
        }
        if let Some(name) = update.name {
            user.name = name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(id_scan) = update.id_scan {
            user.id_scan = Some(id_scan);
        }
        user.touch();

        Ok(self.users.update(&id, user).await?)
    }

    pub async fn delete(&self, id: Uuid) -> PortalResult<()> {
        self.get(id).await?;
        self.users.delete(&id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Email a one-hour reset link to the account holder
    pub async fn request_password_reset(&self, email: &str) -> PortalResult<()> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or_else(|| EntityError::not_found("user", normalize_email(email)))?;

        let token = self.tokens.issue_reset(user.id, user.role)?;
        let link = format!("{}/reset-password/{}", self.frontend_url, token);

        let email = render_reset_email(&ResetEmail {
            portal_name: &self.portal_name,
            to_email: &user.email,
            to_name: &user.name,
            reset_link: &link,
            expires_in_minutes: RESET_LINK_MINUTES,
        })?;
        self.mailer.send(email).await?;

        tracing::info!(user_id = %user.id, "password reset email sent");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> PortalResult<()> {
        let claims = self.tokens.verify(token, TokenPurpose::Reset)?;
        let mut user = self.get(claims.sub).await?;

        user.password_hash = hash_password(new_password)?;
        user.touch();
        self.users.update(&claims.sub, user).await?;

        tracing::info!(user_id = %claims.sub, "password reset");
        Ok(())
    }
}
