// handlers/protected/data_source/data_source_post.rs - POST /data-source

use axum::extract::{Extension, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::NewDataSource;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::parse_fields;

/**
 * POST /data-source - register a Vespa deployment
 *
 * Input:
 * ```json
 * {
 *   "name": "Music",                  // required
 *   "search_url": "http://vespa",     // optional
 *   "search_port": 8080               // optional, also document_* and config_*
 * }
 * ```
 *
 * A "Default" console is created alongside. Responds 201 `{"dataSource": {...}}`.
 */
pub async fn data_source_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    let fields = parse_fields(&body)?;
    let name = fields
        .name
        .ok_or_else(|| ApiError::bad_request("Data source name is required"))?;

    let new = NewDataSource {
        name,
        search_url: fields.search_url,
        search_port: fields.search_port,
        document_url: fields.document_url,
        document_port: fields.document_port,
        config_url: fields.config_url,
        config_port: fields.config_port,
    };

    let data_source = state.data_sources().create(auth.uid, &new).await?;
    Ok(ApiResponse::data("dataSource", data_source).created())
}
