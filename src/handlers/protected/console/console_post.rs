// handlers/protected/console/console_post.rs - POST /data-source/:dsid/console

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::NewConsole;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validate;

use super::optional_bool;

/**
 * POST /data-source/:dsid/console - add a console to a data source
 *
 * Input: `{"name": "Top tracks", "is_default": false}`
 *
 * Making the new console the default demotes the previous one.
 */
pub async fn console_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(data_source_id): Path<String>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;
    let name = validate::require_string(body.get("name").and_then(Value::as_str), "name")?;

    let new = NewConsole {
        name: name.trim().to_string(),
        is_default: optional_bool(body.get("is_default"), "is_default")?.unwrap_or(false),
    };

    let console = state
        .consoles()
        .create(data_source_id, auth.uid, &new)
        .await?
        .ok_or_else(|| ApiError::not_found("Data source not found"))?;

    tracing::info!("User {} created console {} on data source {}", auth.uid, console.id, data_source_id);
    Ok(ApiResponse::data("console", console).created())
}
