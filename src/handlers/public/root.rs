// handlers/public/root.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::database::DatabaseManager;
use crate::middleware::ApiResponse;

pub async fn root_get() -> ApiResponse {
    ApiResponse::ok()
}

/**
 * GET /health - liveness plus a database ping
 *
 * `{"status":"ok"}` when Postgres answers, 503 `{"status":"degraded"}` otherwise.
 */
pub async fn health_get(State(state): State<AppState>) -> Response {
    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => ApiResponse::ok().into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "degraded" }))).into_response()
        }
    }
}
