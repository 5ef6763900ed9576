//! HTTP handlers for complaints (`/api/complaints`)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::validation::validators::not_blank;
use crate::core::{Auth, AuthPolicy, Entity, EntityError, PortalResult, ValidatedJson};
use crate::entities::{Complaint, ComplaintStatus};
use crate::server::host::ServerHost;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    #[serde(default)]
    pub rental_id: Option<Uuid>,
    #[validate(custom(function = "not_blank", message = "Subject is required"))]
    pub subject: String,
    #[validate(custom(function = "not_blank", message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateComplaintStatusRequest {
    pub status: ComplaintStatus,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/add", post(create_complaint))
        .route("/all", get(list_all))
        .route("/my", get(list_mine))
        .route("/{id}/status", put(update_status))
        .route("/{id}", get(get_complaint).delete(delete_complaint))
}

async fn load_complaint(host: &ServerHost, id: Uuid) -> PortalResult<Complaint> {
    host.stores
        .complaints
        .get(&id)
        .await?
        .ok_or_else(|| EntityError::not_found("complaint", id).into())
}

pub async fn create_complaint(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateComplaintRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    let tenant_id = ctx.require_user()?;

    let house_id = match request.rental_id {
        Some(rental_id) => {
            let rental = host
                .stores
                .rentals
                .get(&rental_id)
                .await?
                .ok_or_else(|| EntityError::not_found("rental", rental_id))?;
            Some(rental.house_id)
        }
        None => None,
    };

    let complaint = host
        .stores
        .complaints
        .create(Complaint::new(
            tenant_id,
            request.rental_id,
            house_id,
            request.subject.trim().to_string(),
            request.description.trim().to_string(),
        ))
        .await?;

    tracing::info!(complaint_id = %complaint.id, tenant_id = %tenant_id, "complaint filed");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Complaint submitted successfully", "complaint": complaint })),
    ))
}

pub async fn list_all(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let complaints = host.stores.complaints.list().await?;
    Ok(Json(json!({ "complaints": complaints })))
}

pub async fn list_mine(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    let tenant_id = ctx.require_user()?;
    let complaints = host
        .stores
        .complaints
        .search("tenantId", &tenant_id.to_string())
        .await?;
    Ok(Json(json!({ "complaints": complaints })))
}

pub async fn get_complaint(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let complaint = load_complaint(&host, id).await?;
    AuthPolicy::owner_or_admin(complaint.tenant_id).enforce(&ctx)?;
    Ok(Json(json!({ "complaint": complaint })))
}

pub async fn update_status(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateComplaintStatusRequest>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let mut complaint = load_complaint(&host, id).await?;

    complaint.status = request.status;
    complaint.touch();
    let complaint = host.stores.complaints.update(&id, complaint).await?;

    Ok(Json(json!({ "message": "Complaint status updated", "complaint": complaint })))
}

pub async fn delete_complaint(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    load_complaint(&host, id).await?;
    host.stores.complaints.delete(&id).await?;
    Ok(Json(json!({ "message": "Complaint deleted successfully" })))
}
