// handlers/public/auth/logout.rs - POST /auth/logout handler

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
};

use crate::app::AppState;
use crate::auth::read_cookie;
use crate::error::ApiError;
use crate::middleware::ApiResponse;

/// Destroys the session behind the cookie (if any) and expires the cookie
pub async fn logout_post(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = read_cookie(&headers, &state.config.session.cookie_name) {
        if state.sessions().destroy(&token).await? {
            tracing::info!("Session closed");
        }
    }

    Ok((
        [(SET_COOKIE, state.cookies().cleared_cookie())],
        ApiResponse::message("Logged out"),
    ))
}
