use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::auth::{generate_token, hash_token};
use crate::database::models::Session;
use crate::database::DatabaseError;

/// Postgres-backed session store. Expiry is fixed at creation (not rolling).
pub struct SessionService {
    pool: PgPool,
    max_age: Duration,
}

impl SessionService {
    pub fn new(pool: PgPool, max_age_secs: i64) -> Self {
        Self {
            pool,
            max_age: Duration::seconds(max_age_secs),
        }
    }

    /// Persist a session and return the raw token for the cookie
    pub async fn create(&self, uid: i64, email: &str) -> Result<String, DatabaseError> {
        let token = generate_token();
        let expires_at = Utc::now() + self.max_age;

        sqlx::query("INSERT INTO sessions (sid, uid, email, expires_at) VALUES ($1, $2, $3, $4)")
            .bind(hash_token(&token))
            .bind(uid)
            .bind(email)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Live session for a cookie token; expired sessions are treated as absent
    pub async fn load(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE sid = $1 AND expires_at > NOW()",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    pub async fn destroy(&self, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE sid = $1")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn prune_expired(&self) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
