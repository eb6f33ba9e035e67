// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{extract::State, http::header::SET_COOKIE, response::AppendHeaders, response::IntoResponse};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::ApiResponse;
use crate::validate;

/**
 * POST /auth/login - open a session for an email address
 *
 * Input: `{"email": "ada@example.com"}`
 *
 * The user row is created on first login. Two cookies come back: the
 * HttpOnly session cookie and `loginEmail`, which the login form reads to
 * prefill the address next time.
 */
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate::require_email(body.get("email").and_then(Value::as_str), "email")?;

    let user = state.users().get_or_create(&email).await?;
    let token = state.sessions().create(user.uid, &user.email).await?;

    tracing::info!("User {} logged in", user.uid);

    let cookies = state.cookies();
    Ok((
        AppendHeaders([
            (SET_COOKIE, cookies.login_email_cookie(&email)),
            (SET_COOKIE, cookies.session_cookie(&token)),
        ]),
        ApiResponse::ok(),
    ))
}
