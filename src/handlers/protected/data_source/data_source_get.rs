// handlers/protected/data_source/data_source_get.rs - GET /data-source[/:id]

use axum::extract::{Extension, Path, Query, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::types::{PageQuery, Pagination};
use crate::validate;

/**
 * GET /data-source?limit=&offset= - the caller's data sources, oldest first
 *
 * Each item carries its `consoles` (default first) so the sidebar renders
 * from a single request.
 */
pub async fn data_source_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
) -> ApiResult {
    let (limit, offset) = page.resolve();
    let (items, total) = state.data_sources().list(auth.uid, limit, offset).await?;

    Ok(ApiResponse::list(items, Pagination { limit, offset, total }))
}

pub async fn data_source_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = validate::data_source_id(&id)?;

    let data_source = state
        .data_sources()
        .get(id, auth.uid)
        .await?
        .ok_or_else(|| ApiError::not_found("Data source not found"))?;

    Ok(ApiResponse::data("dataSource", data_source))
}
