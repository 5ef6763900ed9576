//! HTTP handlers for payments (`/api/payment`)

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
use crate::core::{Auth, AuthPolicy, PortalResult, ValidatedJson};
use crate::entities::{NewPayment, PaymentMethod};
use crate::server::host::ServerHost;

/// Body of `POST /api/payment/add`
///
/// The paying tenant is always the caller; a `tenantId` in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub rental_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be a positive number"))]
    pub amount: f64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Month is required"))]
    pub month: String,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/add", post(create_payment))
        .route("/all", get(list_all))
        .route("/my", get(list_mine))
        .route("/latest/{tenant_id}", get(latest_for_tenant))
        .route("/approve/{payment_id}", put(approve_payment))
        .route("/{id}", get(get_payment))
}

pub async fn create_payment(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreatePaymentRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    let tenant_id = ctx.require_user()?;

    let payment = host
        .ledger()
        .create_payment(NewPayment {
            tenant_id,
            rental_id: request.rental_id,
            amount: request.amount,
            method: request.method,
            transaction_id: request.transaction_id,
            month: request.month.trim().to_string(),
            receipt_url: request.receipt_url,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Payment recorded successfully",
            "payment": payment,
        })),
    ))
}

pub async fn list_all(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let payments = host.ledger().list_all().await?;
    Ok(Json(json!({ "payments": payments })))
}

pub async fn list_mine(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    let tenant_id = ctx.require_user()?;
    let payments = host.ledger().list_for_tenant(tenant_id).await?;
    Ok(Json(json!({ "payments": payments })))
}

pub async fn latest_for_tenant(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(tenant_id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::owner_or_admin(tenant_id).enforce(&ctx)?;
    let payment = host.ledger().latest_for_tenant(tenant_id).await?;
    Ok(Json(json!({ "payment": payment })))
}

pub async fn get_payment(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let payment = host.ledger().get(id).await?;
    AuthPolicy::owner_or_admin(payment.tenant_id).enforce(&ctx)?;
    Ok(Json(json!({ "payment": payment })))
}

pub async fn approve_payment(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(payment_id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let admin_id = ctx.require_user()?;

    let payment = host.ledger().approve_cash_payment(payment_id, admin_id).await?;
    Ok(Json(json!({
        "message": "Cash payment approved",
        "payment": payment,
    })))
}
