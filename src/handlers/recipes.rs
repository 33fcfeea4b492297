use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState, models::RecipeOwner};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub async fn get_menu_recipe(
    State(state): State<AppState>,
    Path(menu_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let lines = state
        .services
        .recipes
        .lines_for_menu(&menu_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lines))
}

pub async fn get_wip_recipe(
    State(state): State<AppState>,
    Path(wip_item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .catalog
        .get_wip_item(&wip_item_id)
        .await
        .map_err(map_service_error)?;
    let lines = state
        .services
        .recipes
        .lines_for(&RecipeOwner::Wip(wip_item_id))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(lines))
}

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/menu/:menu_id", get(get_menu_recipe))
        .route("/wip/:wip_item_id", get(get_wip_recipe))
}
