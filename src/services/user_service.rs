use sqlx::PgPool;

use crate::database::models::{User, UserUpdate};
use crate::database::DatabaseError;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, uid: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a user; a concurrent insert of the same email returns the existing row.
    pub async fn create(&self, email: &str) -> Result<User, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created user {} ({})", user.uid, user.email);
        Ok(user)
    }

    pub async fn get_or_create(&self, email: &str) -> Result<User, DatabaseError> {
        match self.get_by_email(email).await? {
            Some(user) => Ok(user),
            None => self.create(email).await,
        }
    }

    /// Apply the provided fields; nothing provided is a no-op
    pub async fn update(&self, uid: i64, update: &UserUpdate) -> Result<(), DatabaseError> {
        let Some(name) = &update.name else {
            return Ok(());
        };

        sqlx::query("UPDATE users SET name = $1, updated_at = NOW() WHERE uid = $2")
            .bind(name.trim())
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_last_seen(&self, uid: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET last_seen = NOW() WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
