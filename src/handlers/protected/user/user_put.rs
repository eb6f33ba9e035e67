// handlers/protected/user/user_put.rs - PUT /user handler

use axum::extract::{Extension, State};
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::UserUpdate;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validate;

/**
 * PUT /user - update the caller's profile
 *
 * Input: `{"name": "Ada"}`; every field is optional and an empty body is a no-op.
 */
pub async fn user_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    let update = UserUpdate {
        name: validate::optional_string(body.get("name"), "name")?,
    };

    state.users().update(auth.uid, &update).await?;
    Ok(ApiResponse::ok())
}
