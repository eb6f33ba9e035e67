// handlers/protected/console/console_execute.rs - POST /data-source/:dsid/console/:id/execute

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ExecuteRequest;
use crate::validate;

/**
 * POST /data-source/:dsid/console/:id/execute - run the console's query
 *
 * Input:
 * ```json
 * {
 *   "yql": "select * from music where true",             // required
 *   "parameters": [{ "key": "hits", "value": "20" }],    // optional, or an object
 *   "console_data": { ... }                              // optional editor state to save
 * }
 * ```
 *
 * Output: `{"result": {"success", "status", "statusText", "data", "elapsedMs"}}`,
 * or `{"result": {"success": false, "error", "elapsedMs"}}` when Vespa could
 * not be reached. An upstream error status is still a 200 here.
 */
pub async fn console_execute(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((data_source_id, id)): Path<(String, String)>,
    ApiJson(request): ApiJson<ExecuteRequest>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;
    let selector = validate::console_selector(&id)?;
    let yql = validate::require_string(request.yql.as_deref(), "yql")?;

    let outcome = state
        .queries()
        .execute(auth.uid, data_source_id, selector, &yql, request)
        .await?;

    Ok(ApiResponse::data("result", outcome))
}
