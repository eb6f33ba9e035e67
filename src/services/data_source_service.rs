use std::collections::HashMap;

use sqlx::PgPool;

use crate::database::models::{
    ConsoleSummary, DataSource, DataSourceUpdate, DataSourceWithConsoles, NewDataSource,
    DEFAULT_CONSOLE_NAME,
};
use crate::database::DatabaseError;

/// Data source CRUD. Every statement is scoped to the owning uid.
pub struct DataSourceService {
    pool: PgPool,
}

impl DataSourceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Page of the user's data sources with their consoles, plus the total count
    pub async fn list(
        &self,
        uid: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<DataSourceWithConsoles>, i64), DatabaseError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM data_sources WHERE uid = $1")
            .bind(uid)
            .fetch_one(&self.pool)
            .await?;

        let data_sources = sqlx::query_as::<_, DataSource>(
            "SELECT * FROM data_sources WHERE uid = $1 ORDER BY id ASC LIMIT $2 OFFSET $3",
        )
        .bind(uid)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        if data_sources.is_empty() {
            return Ok((Vec::new(), total));
        }

        let ids: Vec<i64> = data_sources.iter().map(|ds| ds.id).collect();
        let consoles = sqlx::query_as::<_, ConsoleSummary>(
            r#"
            SELECT id, data_source_id, name, is_default
            FROM consoles
            WHERE uid = $1 AND data_source_id = ANY($2)
            ORDER BY is_default DESC, id ASC
            "#,
        )
        .bind(uid)
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        Ok((attach_consoles(data_sources, consoles), total))
    }

    pub async fn get(&self, id: i64, uid: i64) -> Result<Option<DataSource>, DatabaseError> {
        let data_source = sqlx::query_as::<_, DataSource>(
            "SELECT * FROM data_sources WHERE id = $1 AND uid = $2",
        )
        .bind(id)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data_source)
    }

    /// Insert the data source together with its default console
    pub async fn create(&self, uid: i64, new: &NewDataSource) -> Result<DataSource, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let data_source = sqlx::query_as::<_, DataSource>(
            r#"
            INSERT INTO data_sources (
                uid, name, search_url, search_port, document_url, document_port, config_url, config_port
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(&new.name)
        .bind(&new.search_url)
        .bind(new.search_port)
        .bind(&new.document_url)
        .bind(new.document_port)
        .bind(&new.config_url)
        .bind(new.config_port)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO consoles (uid, data_source_id, name, is_default) VALUES ($1, $2, $3, TRUE)",
        )
        .bind(uid)
        .bind(data_source.id)
        .bind(DEFAULT_CONSOLE_NAME)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("User {} created data source {} ({})", uid, data_source.id, data_source.name);
        Ok(data_source)
    }

    /// Partial update. An empty update returns the current row untouched.
    pub async fn update(
        &self,
        id: i64,
        uid: i64,
        update: &DataSourceUpdate,
    ) -> Result<Option<DataSource>, DatabaseError> {
        if update.is_empty() {
            return self.get(id, uid).await;
        }

        let data_source = sqlx::query_as::<_, DataSource>(
            r#"
            UPDATE data_sources SET
                name = COALESCE($3, name),
                search_url = COALESCE($4, search_url),
                search_port = COALESCE($5, search_port),
                document_url = COALESCE($6, document_url),
                document_port = COALESCE($7, document_port),
                config_url = COALESCE($8, config_url),
                config_port = COALESCE($9, config_port),
                updated_at = NOW()
            WHERE id = $1 AND uid = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(uid)
        .bind(&update.name)
        .bind(&update.search_url)
        .bind(update.search_port)
        .bind(&update.document_url)
        .bind(update.document_port)
        .bind(&update.config_url)
        .bind(update.config_port)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data_source)
    }

    /// Delete; consoles go with it via ON DELETE CASCADE
    pub async fn remove(&self, id: i64, uid: i64) -> Result<bool, DatabaseError> {
        let deleted = sqlx::query_scalar::<_, i64>(
            "DELETE FROM data_sources WHERE id = $1 AND uid = $2 RETURNING id",
        )
        .bind(id)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        if deleted.is_some() {
            tracing::info!("User {} deleted data source {}", uid, id);
        }
        Ok(deleted.is_some())
    }
}

/// Group console rows under their data source, keeping both orders stable
fn attach_consoles(
    data_sources: Vec<DataSource>,
    consoles: Vec<ConsoleSummary>,
) -> Vec<DataSourceWithConsoles> {
    let mut by_source: HashMap<i64, Vec<ConsoleSummary>> = HashMap::new();
    for console in consoles {
        by_source.entry(console.data_source_id).or_default().push(console);
    }

    data_sources
        .into_iter()
        .map(|data_source| DataSourceWithConsoles {
            consoles: by_source.remove(&data_source.id).unwrap_or_default(),
            data_source,
        })
        .collect()
}
