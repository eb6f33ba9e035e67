// handlers/public/auth/google.rs - GET /auth/google handler

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::{generate_token, read_cookie, GoogleOAuth, OAUTH_STATE_COOKIE};
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct GoogleCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/**
 * GET /auth/google - start or finish Google sign-in
 *
 * Without `code` the browser is sent to Google's consent screen. Google
 * sends it back here with `code` and `state`; on success a session is opened
 * and the browser lands on the web client, otherwise on
 * `/login?error=invalid_state|auth_failed`.
 *
 * Only routed when Google sign-in is configured.
 */
pub async fn google_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(callback): Query<GoogleCallback>,
) -> Response {
    let Some(google) = state.google.clone() else {
        return ApiError::not_found("Resource not found").into_response();
    };
    let cookies = state.cookies();
    let web = state.config.google.web_base_url.trim_end_matches('/').to_string();
    let failed = |reason: &str| {
        (
            AppendHeaders([(SET_COOKIE, cookies.cleared_oauth_state_cookie())]),
            Redirect::to(&format!("{}/login?error={}", web, reason)),
        )
            .into_response()
    };

    let Some(code) = callback.code.filter(|code| !code.is_empty()) else {
        if let Some(error) = callback.error {
            tracing::warn!("Google sign-in declined: {}", error);
            return failed("auth_failed");
        }

        let oauth_state = generate_token();
        return (
            AppendHeaders([(SET_COOKIE, cookies.oauth_state_cookie(&oauth_state))]),
            Redirect::to(google.authorize_url(&oauth_state).as_str()),
        )
            .into_response();
    };

    let expected = read_cookie(&headers, OAUTH_STATE_COOKIE);
    if expected.is_none() || expected != callback.state {
        tracing::warn!("Google sign-in callback with mismatched state");
        return failed("invalid_state");
    }

    match sign_in(&state, &google, &code).await {
        Ok(token) => (
            AppendHeaders([
                (SET_COOKIE, cookies.session_cookie(&token)),
                (SET_COOKIE, cookies.cleared_login_email_cookie()),
                (SET_COOKIE, cookies.cleared_oauth_state_cookie()),
            ]),
            Redirect::to(&format!("{}/", web)),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("Google sign-in failed: {:#}", e);
            failed("auth_failed")
        }
    }
}

/// Exchange the code, get or create the user, and open a session
async fn sign_in(state: &AppState, google: &GoogleOAuth, code: &str) -> anyhow::Result<String> {
    let email = google.email_for_code(code).await?;
    let user = state.users().get_or_create(&email).await?;
    let token = state.sessions().create(user.uid, &user.email).await?;

    tracing::info!("User {} logged in with Google", user.uid);
    Ok(token)
}
