// handlers/protected/data_source/data_source_put.rs - PUT /data-source/:id

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validate;

use super::parse_fields;

/// Partial update; fields left out keep their stored value
pub async fn data_source_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    let id = validate::data_source_id(&id)?;
    let update = parse_fields(&body)?;

    let data_source = state
        .data_sources()
        .update(id, auth.uid, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Data source not found"))?;

    Ok(ApiResponse::data("dataSource", data_source))
}
