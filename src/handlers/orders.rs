use super::common::{created_response, map_service_error, success_response, validate_input, Actor};
use crate::{
    entities::purchase_order::OrderStatus,
    errors::ApiError,
    handlers::AppState,
    services::procurement::{
        AddOrderLineInput, CreateOrderInput, FromRecommendationInput, ReceivedLine,
    },
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub store_id: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeliveryRequest {
    pub lines: Vec<ReceivedLine>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let status = filter
        .status
        .as_deref()
        .map(OrderStatus::parse)
        .transpose()
        .map_err(map_service_error)?;
    let orders = state
        .services
        .procurement
        .list_orders(filter.store_id.as_deref(), status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(orders))
}

pub async fn create_order(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut payload): Json<CreateOrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if payload.employee_id.is_none() {
        payload.employee_id = Some(actor.0);
    }
    let order = state
        .services
        .procurement
        .create_order(payload)
        .await
        .map_err(map_service_error)?;

    info!("Purchase order created: {}", order.order_number);
    Ok(created_response(order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .procurement
        .get_order(order_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

pub async fn add_order_line(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<AddOrderLineInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let line = state
        .services
        .procurement
        .add_order_line(order_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(line))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let status = OrderStatus::parse(&payload.status).map_err(map_service_error)?;
    let order = state
        .services
        .procurement
        .update_status(order_id, status)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

/// Receive an ORDERED purchase order into stock
pub async fn confirm_delivery(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    actor: Actor,
    Json(payload): Json<ConfirmDeliveryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .procurement
        .confirm_delivery(order_id, payload.lines, actor.as_str())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(order))
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let groups = state
        .services
        .procurement
        .generate_recommendations(&store_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(groups))
}

pub async fn create_from_recommendation(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut payload): Json<FromRecommendationInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if payload.employee_id.is_none() {
        payload.employee_id = Some(actor.0);
    }
    let order = state
        .services
        .procurement
        .create_from_recommendation(payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(order))
}

/// Creates the router for purchase order endpoints
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/from-recommendation", post(create_from_recommendation))
        .route("/recommendations/:store_id", get(get_recommendations))
        .route("/:id", get(get_order))
        .route("/:id/lines", post(add_order_line))
        .route("/:id/status", patch(update_order_status))
        .route("/:id/delivery", post(confirm_delivery))
}
