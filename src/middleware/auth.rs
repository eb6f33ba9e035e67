use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::read_cookie;
use crate::error::ApiError;

/// Authenticated user context resolved from the session cookie
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub uid: i64,
    pub email: String,
}

/// Rejects requests without a live session and injects `AuthUser`
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(token) = read_cookie(request.headers(), &state.config.session.cookie_name) else {
        return ApiError::unauthorized("Authentication required").into_response();
    };

    let session = match state.sessions().load(&token).await {
        Ok(Some(session)) => session,
        Ok(None) => return ApiError::unauthorized("Authentication required").into_response(),
        Err(e) => return ApiError::from(e).into_response(),
    };

    if session.uid <= 0 || session.email.is_empty() {
        tracing::warn!("Session for uid {} is missing its user", session.uid);
        return ApiError::unauthorized("Invalid session").into_response();
    }

    request.extensions_mut().insert(AuthUser {
        uid: session.uid,
        email: session.email,
    });

    next.run(request).await
}
