use super::common::{map_service_error, success_response, Actor};
use crate::{errors::ApiError, handlers::AppState, models::ItemRef};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct AlertFilter {
    pub store_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub item: ItemRef,
    pub delta: Decimal,
}

#[derive(Debug, Serialize)]
pub struct QuantityResponse {
    pub store_id: String,
    pub item: ItemRef,
    pub quantity: Decimal,
}

pub async fn list_inventory(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .get_store(&store_id)
        .await
        .map_err(map_service_error)?;
    let lines = state
        .services
        .inventory
        .list_inventory(&store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lines))
}

pub async fn list_wip_inventory(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state
        .services
        .inventory
        .list_wip_inventory(&store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lines))
}

/// Overwrite the on-hand quantity of a product
pub async fn set_product_quantity(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(String, String)>,
    actor: Actor,
    Json(payload): Json<SetQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.quantity.is_sign_negative() && !payload.quantity.is_zero() {
        return Err(ApiError::ValidationError(
            "Quantity must not be negative".to_string(),
        ));
    }
    let item = ItemRef::Product(product_id);
    state
        .services
        .inventory
        .set_quantity(&store_id, &item, payload.quantity, actor.as_str())
        .await
        .map_err(map_service_error)?;

    info!(%store_id, %item, "Inventory quantity set via API");
    Ok(success_response(QuantityResponse {
        store_id,
        item,
        quantity: payload.quantity,
    }))
}

pub async fn adjust_quantity(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    actor: Actor,
    Json(payload): Json<AdjustQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let quantity = state
        .services
        .inventory
        .adjust_quantity(&store_id, &payload.item, payload.delta, actor.as_str())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(QuantityResponse {
        store_id,
        item: payload.item,
        quantity,
    }))
}

pub async fn low_stock_alerts(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let alerts = state
        .services
        .inventory
        .low_stock_alerts(filter.store_id.as_deref())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(alerts))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(low_stock_alerts))
        .route("/:store_id", get(list_inventory))
        .route("/:store_id/wip", get(list_wip_inventory))
        .route("/:store_id/adjustments", post(adjust_quantity))
        .route("/:store_id/products/:product_id", put(set_product_quantity))
}
