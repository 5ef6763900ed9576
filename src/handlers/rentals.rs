//! HTTP handlers for rentals (`/api/rental`)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::{
    Auth, AuthPolicy, Entity, EntityError, PortalResult, ValidatedJson, ValidationError,
};
use crate::entities::{Availability, Rental, RentalPaymentStatus, RentalStatus};
use crate::handlers::houses::load_house;
use crate::payments::view::{UNKNOWN_HOUSE, UNKNOWN_TENANT};
use crate::server::host::ServerHost;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentalRequest {
    pub house_id: Uuid,
    pub tenant_id: Uuid,
    #[validate(range(exclusive_min = 0.0, message = "Rent amount must be a positive number"))]
    pub amount: f64,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRentalRequest {
    #[validate(range(exclusive_min = 0.0, message = "Rent amount must be a positive number"))]
    pub amount: Option<f64>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub payment_status: Option<RentalPaymentStatus>,
    pub rental_status: Option<RentalStatus>,
}

/// Rental with the tenant's name and the house number resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalView {
    #[serde(flatten)]
    pub rental: Rental,
    pub tenant_name: String,
    pub house_no: String,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/add", post(create_rental))
        .route("/", get(list_rentals))
        .route("/my", get(list_mine))
        .route("/{id}", get(get_rental).put(update_rental).delete(delete_rental))
}

async fn load_rental(host: &ServerHost, id: Uuid) -> PortalResult<Rental> {
    host.stores
        .rentals
        .get(&id)
        .await?
        .ok_or_else(|| EntityError::not_found("rental", id).into())
}

async fn set_house_availability(
    host: &ServerHost,
    house_id: Uuid,
    availability: Availability,
) -> PortalResult<()> {
    match host.stores.houses.get(&house_id).await? {
        Some(mut house) => {
            house.availability = availability;
            house.touch();
            host.stores.houses.update(&house_id, house).await?;
        }
        None => tracing::warn!(house_id = %house_id, "house of rental no longer exists"),
    }
    Ok(())
}

async fn view(host: &ServerHost, rental: Rental) -> PortalResult<RentalView> {
    let tenant_name = host
        .stores
        .users
        .get(&rental.tenant_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| UNKNOWN_TENANT.to_string());
    let house_no = host
        .stores
        .houses
        .get(&rental.house_id)
        .await?
        .map(|h| h.house_no)
        .unwrap_or_else(|| UNKNOWN_HOUSE.to_string());

    Ok(RentalView {
        rental,
        tenant_name,
        house_no,
    })
}

pub async fn create_rental(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateRentalRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;

    let house = load_house(&host, request.house_id).await?;
    if !house.is_available() {
        return Err(ValidationError::field("houseId", "House is already occupied").into());
    }
    if host.stores.users.get(&request.tenant_id).await?.is_none() {
        return Err(EntityError::not_found("tenant", request.tenant_id).into());
    }

    let rental = host
        .stores
        .rentals
        .create(Rental::new(
            house.id,
            request.tenant_id,
            request.amount,
            request.start_date.unwrap_or_else(Utc::now),
            request.next_payment_date,
        ))
        .await?;
    set_house_availability(&host, house.id, Availability::Occupied).await?;

    tracing::info!(
        rental_id = %rental.id,
        house_id = %house.id,
        tenant_id = %rental.tenant_id,
        "rental created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Rental created successfully", "rental": rental })),
    ))
}

pub async fn list_rentals(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;

    let mut rentals = Vec::new();
    for rental in host.stores.rentals.list().await? {
        rentals.push(view(&host, rental).await?);
    }
    Ok(Json(json!({ "rentals": rentals })))
}

pub async fn list_mine(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    let tenant_id = ctx.require_user()?;

    let mut rentals = Vec::new();
    for rental in host.stores.rentals.search("tenantId", &tenant_id.to_string()).await? {
        rentals.push(view(&host, rental).await?);
    }
    Ok(Json(json!({ "rentals": rentals })))
}

pub async fn get_rental(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let rental = load_rental(&host, id).await?;
    AuthPolicy::owner_or_admin(rental.tenant_id).enforce(&ctx)?;
    Ok(Json(json!({ "rental": view(&host, rental).await? })))
}

pub async fn update_rental(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRentalRequest>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let mut rental = load_rental(&host, id).await?;
    let was_active = rental.is_active();

    if let Some(amount) = request.amount {
        rental.amount = amount;
    }
    if let Some(next) = request.next_payment_date {
        rental.next_payment_date = Some(next);
    }
    if let Some(status) = request.payment_status {
        rental.payment_status = status;
    }
    if let Some(status) = request.rental_status {
        rental.rental_status = status;
    }
    rental.touch();

    let reactivated = !was_active && rental.is_active();
    if reactivated && !load_house(&host, rental.house_id).await?.is_available() {
        return Err(ValidationError::field("rentalStatus", "House is already occupied").into());
    }

    let rental = host.stores.rentals.update(&id, rental).await?;
    if was_active && !rental.is_active() {
        set_house_availability(&host, rental.house_id, Availability::Available).await?;
        tracing::info!(rental_id = %id, "rental ended, house released");
    } else if reactivated {
        set_house_availability(&host, rental.house_id, Availability::Occupied).await?;
        tracing::info!(rental_id = %id, "rental reactivated, house occupied");
    }

    Ok(Json(json!({ "message": "Rental updated successfully", "rental": rental })))
}

pub async fn delete_rental(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let rental = load_rental(&host, id).await?;

    host.stores.rentals.delete(&id).await?;
    // an ended rental no longer holds the house
    if rental.is_active() {
        set_house_availability(&host, rental.house_id, Availability::Available).await?;
    }

    tracing::info!(rental_id = %id, "rental deleted");
    Ok(Json(json!({ "message": "Rental deleted successfully" })))
}
