// handlers/protected/data_source/data_source_delete.rs - DELETE /data-source/:id

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validate;

pub async fn data_source_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = validate::data_source_id(&id)?;

    if !state.data_sources().remove(id, auth.uid).await? {
        return Err(ApiError::not_found("Data source not found"));
    }
    Ok(ApiResponse::ok())
}
