// handlers/mod.rs - two-tier handler layout
//
// public    → no session required (/, /health, /auth/login|check|logout)
// protected → `require_auth` session required (/auth/me, /user, /data-source, /console)

pub mod protected;
pub mod public;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `Json` extractor whose rejections use the API error body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
