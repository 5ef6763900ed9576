//! HTTP handlers for accounts (`/api/auth`)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::accounts::{ProfileUpdate, Registration};
use crate::core::validation::validators::not_blank;
use crate::core::{Auth, AuthPolicy, PortalResult, ValidatedJson};
use crate::entities::PublicUser;
use crate::server::host::ServerHost;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[validate(custom(function = "not_blank", message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub id_scan: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/users", get(list_users))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
        .route("/edit/{id}", put(edit_user))
        .route("/delete/{id}", delete(delete_user))
        .route("/{id}", get(get_user))
}

pub async fn register(
    State(host): State<Arc<ServerHost>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    host.accounts()
        .register(Registration {
            name: request.name,
            email: request.email,
            phone: request.phone,
            password: request.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login(
    State(host): State<Arc<ServerHost>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> PortalResult<Json<Value>> {
    let session = host
        .accounts()
        .authenticate(&request.email, &request.password)
        .await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": session.token,
        "user": {
            "id": session.user.id,
            "name": session.user.name,
            "email": session.user.email,
            "role": session.user.role,
        },
    })))
}

pub async fn list_users(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let users: Vec<PublicUser> = host
        .accounts()
        .list()
        .await?
        .iter()
        .map(|u| u.public())
        .collect();
    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let user = host.accounts().get(id).await?;
    Ok(Json(json!({ "user": user.public() })))
}

pub async fn edit_user(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<EditUserRequest>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::owner_or_admin(id).enforce(&ctx)?;

    let user = host
        .accounts()
        .update_profile(
            id,
            ProfileUpdate {
                name: request.name,
                email: request.email,
                phone: request.phone,
                id_scan: request.id_scan,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": user.public(),
    })))
}

pub async fn delete_user(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    host.accounts().delete(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

pub async fn forgot_password(
    State(host): State<Arc<ServerHost>>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> PortalResult<Json<Value>> {
    host.accounts().request_password_reset(&request.email).await?;
    Ok(Json(json!({ "message": "Password reset link sent to your email" })))
}

pub async fn reset_password(
    State(host): State<Arc<ServerHost>>,
    Path(token): Path<String>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> PortalResult<Json<Value>> {
    host.accounts().reset_password(&token, &request.password).await?;
    Ok(Json(json!({ "message": "Password has been reset successfully" })))
}
