use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Server-side session row. `sid` is the SHA-256 of the cookie token.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
    pub sid: String,
    pub uid: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
