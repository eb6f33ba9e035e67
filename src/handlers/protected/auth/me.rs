// handlers/protected/auth/me.rs - GET /auth/me handler

use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// Current user; also refreshes `last_seen`
pub async fn me_get(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult {
    let users = state.users();
    users.update_last_seen(auth.uid).await?;

    let user = users
        .get(auth.uid)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::data("user", user))
}
