use super::common::{created_response, map_service_error, success_response, validate_input, Actor};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::stocktaking::{AddDetailInput, CreateStocktakingInput, StocktakingWithDetails},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StocktakingFilter {
    pub store_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStocktakingRequest {
    pub store_id: String,
    pub employee_id: Option<String>,
    pub stocktaking_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Snapshot the location's ledger onto the new sheet
    #[serde(default)]
    pub auto_generate: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecordCountRequest {
    pub actual_quantity: Decimal,
    pub notes: Option<String>,
}

pub async fn list_stocktakings(
    State(state): State<AppState>,
    Query(filter): Query<StocktakingFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let sheets = state
        .services
        .stocktaking
        .list_stocktakings(filter.store_id.as_deref())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(sheets))
}

pub async fn create_stocktaking(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateStocktakingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateStocktakingInput {
        store_id: payload.store_id,
        employee_id: payload.employee_id.unwrap_or(actor.0),
        stocktaking_date: payload.stocktaking_date,
        notes: payload.notes,
    };
    validate_input(&input)?;

    let service = &state.services.stocktaking;
    let created = if payload.auto_generate {
        service.create_with_snapshot(input).await
    } else {
        service
            .create_stocktaking(input)
            .await
            .map(|stocktaking| StocktakingWithDetails {
                stocktaking,
                details: Vec::new(),
            })
    }
    .map_err(map_service_error)?;
    Ok(created_response(created))
}

pub async fn get_stocktaking(
    State(state): State<AppState>,
    Path(stocktaking_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let sheet = state
        .services
        .stocktaking
        .get_stocktaking(stocktaking_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(sheet))
}

pub async fn add_detail(
    State(state): State<AppState>,
    Path(stocktaking_id): Path<Uuid>,
    Json(payload): Json<AddDetailInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let detail = state
        .services
        .stocktaking
        .add_detail(stocktaking_id, payload)
        .await
        .map_err(map_service_error)?;
    Ok(created_response(detail))
}

pub async fn record_count(
    State(state): State<AppState>,
    Path(detail_id): Path<Uuid>,
    Json(payload): Json<RecordCountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .services
        .stocktaking
        .record_count(detail_id, payload.actual_quantity, payload.notes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(detail))
}

pub async fn confirm_stocktaking(
    State(state): State<AppState>,
    Path(stocktaking_id): Path<Uuid>,
    actor: Actor,
) -> Result<impl IntoResponse, ApiError> {
    let sheet = state
        .services
        .stocktaking
        .confirm(stocktaking_id, actor.as_str())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(sheet))
}

pub async fn get_analysis(
    State(state): State<AppState>,
    Path(stocktaking_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let analysis = state
        .services
        .stocktaking
        .analysis(stocktaking_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(analysis))
}

pub fn stocktaking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stocktakings).post(create_stocktaking))
        .route("/details/:detail_id", patch(record_count))
        .route("/:id", get(get_stocktaking))
        .route("/:id/details", post(add_detail))
        .route("/:id/confirm", post(confirm_stocktaking))
        .route("/:id/analysis", get(get_analysis))
}
