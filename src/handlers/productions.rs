use super::common::{created_response, map_service_error, success_response, validate_input, Actor};
use crate::{
    errors::ApiError, handlers::AppState, services::production::RecordProductionInput,
};
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HistoryFilter {
    pub store_id: Option<String>,
    pub wip_item_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckIngredientsRequest {
    pub store_id: String,
    pub wip_item_id: String,
    pub quantity: Decimal,
}

pub async fn production_history(
    State(state): State<AppState>,
    Query(filter): Query<HistoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state
        .services
        .production
        .get_production_history(filter.store_id.as_deref(), filter.wip_item_id.as_deref())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(history))
}

pub async fn check_ingredients(
    State(state): State<AppState>,
    Json(payload): Json<CheckIngredientsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let check = state
        .services
        .production
        .check_required_ingredients(&payload.store_id, &payload.wip_item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(check))
}

pub async fn record_production(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut payload): Json<RecordProductionInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    if payload.employee_id.is_none() {
        payload.employee_id = Some(actor.0.clone());
    }
    let production = state
        .services
        .production
        .record_production(payload, actor.as_str())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(production))
}

pub fn production_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(production_history).post(record_production))
        .route("/check-ingredients", post(check_ingredients))
}
