// handlers/public/auth/check.rs - GET /auth/check handler

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::read_cookie;

/// `{"isLoggedIn": bool, "googleLogin": bool}`. A store error reads as logged
/// out rather than failing.
pub async fn check_get(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let google_login = state.google.is_some();
    let Some(token) = read_cookie(&headers, &state.config.session.cookie_name) else {
        return Json(json!({ "isLoggedIn": false, "googleLogin": google_login }));
    };

    let is_logged_in = match state.sessions().load(&token).await {
        Ok(session) => session.is_some(),
        Err(e) => {
            tracing::warn!("Session lookup failed during check: {}", e);
            false
        }
    };

    Json(json!({ "isLoggedIn": is_logged_in, "googleLogin": google_login }))
}
