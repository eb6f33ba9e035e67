use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(db_err.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Builds the connection pool and owns schema migrations
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool and verify connectivity
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;

        let pool = Self::pool_options(config)
            .connect(&connection_string)
            .await?;

        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Pool that opens connections on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;
        Ok(Self::pool_options(config).connect_lazy(&connection_string)?)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Apply embedded migrations from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// DATABASE_URL wins; otherwise assemble from DB_USER/DB_PASSWORD/DB_HOST/DB_PORT/DB_NAME
    fn connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &config.url {
            let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(parsed.into());
        }

        let host = config.host.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL or DB_HOST"))?;
        let name = config.name.as_deref().ok_or(DatabaseError::ConfigMissing("DB_NAME"))?;

        let mut url = url::Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(config.port.unwrap_or(5432)))
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if let Some(user) = &config.user {
            url.set_username(user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if let Some(password) = &config.password {
            url.set_password(Some(password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", name));
        Ok(url.into())
    }
}
