//! HTTP handlers for houses (`/api/house`)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::validation::validators::not_blank;
use crate::core::{Auth, AuthPolicy, Entity, EntityError, PortalResult, ValidatedJson};
use crate::entities::{Availability, House};
use crate::server::host::ServerHost;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHouseRequest {
    #[validate(custom(function = "not_blank", message = "House number is required"))]
    pub house_no: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHouseRequest {
    #[validate(custom(function = "not_blank", message = "House number cannot be empty"))]
    pub house_no: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub availability: Option<Availability>,
}

pub fn routes() -> Router<Arc<ServerHost>> {
    Router::new()
        .route("/add", post(create_house))
        .route("/", get(list_houses))
        .route("/available", get(list_available))
        .route("/{id}", get(get_house).put(update_house).delete(delete_house))
}

async fn ensure_house_no_free(
    host: &ServerHost,
    house_no: &str,
    except: Option<Uuid>,
) -> PortalResult<()> {
    let taken = host
        .stores
        .houses
        .search("houseNo", house_no)
        .await?
        .into_iter()
        .any(|h| Some(h.id) != except);

    if taken {
        return Err(EntityError::AlreadyExists {
            entity_type: "house".to_string(),
            field: "houseNo".to_string(),
            value: house_no.to_string(),
        }
        .into());
    }
    Ok(())
}

pub(crate) async fn load_house(host: &ServerHost, id: Uuid) -> PortalResult<House> {
    host.stores
        .houses
        .get(&id)
        .await?
        .ok_or_else(|| EntityError::not_found("house", id).into())
}

pub async fn create_house(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    ValidatedJson(request): ValidatedJson<CreateHouseRequest>,
) -> PortalResult<(StatusCode, Json<Value>)> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;

    let house_no = request.house_no.trim().to_string();
    ensure_house_no_free(&host, &house_no, None).await?;

    let house = host.stores.houses.create(House::new(house_no, request.price)).await?;
    tracing::info!(house_id = %house.id, house_no = %house.house_no, "house added");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "House added successfully", "house": house })),
    ))
}

pub async fn list_houses(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let houses = host.stores.houses.list().await?;
    Ok(Json(json!({ "houses": houses })))
}

pub async fn list_available(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let houses = host.stores.houses.search("availability", "available").await?;
    Ok(Json(json!({ "houses": houses })))
}

pub async fn get_house(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::Authenticated.enforce(&ctx)?;
    let house = load_house(&host, id).await?;
    Ok(Json(json!({ "house": house })))
}

pub async fn update_house(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateHouseRequest>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    let mut house = load_house(&host, id).await?;

    if let Some(house_no) = request.house_no {
        let house_no = house_no.trim().to_string();
        ensure_house_no_free(&host, &house_no, Some(id)).await?;
        house.house_no = house_no;
    }
    if let Some(price) = request.price {
        house.price = price;
    }
    if let Some(availability) = request.availability {
        house.availability = availability;
    }
    house.touch();

    let house = host.stores.houses.update(&id, house).await?;
    Ok(Json(json!({ "message": "House updated successfully", "house": house })))
}

pub async fn delete_house(
    State(host): State<Arc<ServerHost>>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> PortalResult<Json<Value>> {
    AuthPolicy::AdminOnly.enforce(&ctx)?;
    load_house(&host, id).await?;
    host.stores.houses.delete(&id).await?;
    tracing::info!(house_id = %id, "house deleted");
    Ok(Json(json!({ "message": "House deleted successfully" })))
}
