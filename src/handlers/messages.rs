//! HTTP handlers for admin messages (`/api/messages`)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::validation::validators::not_blank;
use crate::core::{Auth, AuthPolicy, EntityError, PortalResult, ValidatedJson};
use crate::entities::Message;
use crate::server::host::ServerHost;

/// Body of `POST /api/messages/send`; no recipient means broadcast
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub recipient_id: Option<Uuid>,
    #[validate(custom(function = "not_blank", message = "Subject is required"))]
    pub subject: String,
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/send", post(send_message))
        .route("/all", get(list_sent))
        .route("/inbox", get(inbox))
        .route("/{id}", delete(delete_message))
}

pub async fn send_message(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<SendMessageRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let sender_id = ctx.require_user()?;

    if let Some(recipient_id) = request.recipient_id
        && host.stores.users.get(&recipient_id).await?.is_none()
    {
        return Err(EntityError::not_found("user", recipient_id).into());
    }

    let message = host
        .stores
        .messages
        .create(Message::new(
            sender_id,
            request.recipient_id,
            request.subject.trim().to_string(),
            request.content.trim().to_string(),
        ))
        .await?;

    tracing::info!(
        message_id = %message.id,
        broadcast = message.is_broadcast,
        "message sent"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Message sent successfully", "data": message })),
    ))
}

pub async fn list_sent(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let messages = host.stores.messages.list().await?;
    Ok(Json(json!({ "messages": messages })))
}

pub async fn inbox(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    let user_id = ctx.require_user()?;
    let messages: Vec<Message> = host
        .stores
        .messages
        .list()
        .await?
        .into_iter()
        .filter(|m| m.is_visible_to(user_id))
        .collect();
    Ok(Json(json!({ "messages": messages })))
}

pub async fn delete_message(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    if host.stores.messages.get(&id).await?.is_none() {
        return Err(EntityError::not_found("message", id).into());
    }
    host.stores.messages.delete(&id).await?;
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}
