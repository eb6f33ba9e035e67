// handlers/protected/console/console_get.rs - console reads

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validate;

/// GET /console - every console the caller owns
pub async fn console_list(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult {
    let consoles = state.consoles().list_for_user(auth.uid).await?;
    Ok(ApiResponse::data("consoles", consoles))
}

/// GET /data-source/:dsid/console and GET /console/data-source/:dsid
pub async fn console_list_for_data_source(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(data_source_id): Path<String>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;

    if state.data_sources().get(data_source_id, auth.uid).await?.is_none() {
        return Err(ApiError::not_found("Data source not found"));
    }

    let consoles = state
        .consoles()
        .list_for_data_source(data_source_id, auth.uid)
        .await?;
    Ok(ApiResponse::data("consoles", consoles))
}

/// GET /console/:id
pub async fn console_get_by_id(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = validate::console_id(&id)?;

    let console = state
        .consoles()
        .get(id, auth.uid)
        .await?
        .ok_or_else(|| ApiError::not_found("Console not found"))?;

    Ok(ApiResponse::data("console", console))
}

/// GET /data-source/:dsid/console/:id, `:id` may be `default`
pub async fn console_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((data_source_id, id)): Path<(String, String)>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;
    let selector = validate::console_selector(&id)?;

    let console = state
        .consoles()
        .resolve(data_source_id, selector, auth.uid)
        .await?
        .ok_or_else(|| ApiError::not_found("Console not found"))?;

    Ok(ApiResponse::data("console", console))
}
