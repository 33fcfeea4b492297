use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<String>,
}

pub async fn list_stores(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stores = state
        .services
        .catalog
        .list_stores()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stores))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_products(filter.category_id.as_deref())
        .await
        .map_err(map_service_error)?;
    Ok(success_response(products))
}

pub async fn list_wip_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .catalog
        .list_wip_items()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

pub async fn list_menus(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let menus = state
        .services
        .catalog
        .list_menus()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(menus))
}

/// Reference data lookups
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/stores", get(list_stores))
        .route("/products", get(list_products))
        .route("/wip-items", get(list_wip_items))
        .route("/menus", get(list_menus))
}
