use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};

use crate::database::models::{Console, ConsoleUpdate, NewConsole, DEFAULT_CONSOLE_NAME};
use crate::database::DatabaseError;
use crate::types::ConsoleSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveConsole {
    Removed,
    NotFound,
    IsDefault,
}

#[derive(Debug, Clone)]
pub enum UpdateConsole {
    Updated(Console),
    NotFound,
    /// `is_default: false` on the current default; a data source always keeps one
    DemotesDefault,
}

/// Console CRUD. Ownership is checked through both the console's uid and
/// the data source it is addressed under.
pub struct ConsoleService {
    pool: PgPool,
}

impl ConsoleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, uid: i64) -> Result<Vec<Console>, DatabaseError> {
        let consoles = sqlx::query_as::<_, Console>(
            "SELECT * FROM consoles WHERE uid = $1 ORDER BY data_source_id ASC, is_default DESC, id ASC",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;
        Ok(consoles)
    }

    pub async fn list_for_data_source(
        &self,
        data_source_id: i64,
        uid: i64,
    ) -> Result<Vec<Console>, DatabaseError> {
        let consoles = sqlx::query_as::<_, Console>(
            r#"
            SELECT * FROM consoles
            WHERE data_source_id = $1 AND uid = $2
            ORDER BY is_default DESC, id ASC
            "#,
        )
        .bind(data_source_id)
        .bind(uid)
        .fetch_all(&self.pool)
        .await?;
        Ok(consoles)
    }

    pub async fn get(&self, id: i64, uid: i64) -> Result<Option<Console>, DatabaseError> {
        let console = sqlx::query_as::<_, Console>("SELECT * FROM consoles WHERE id = $1 AND uid = $2")
            .bind(id)
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?;
        Ok(console)
    }

    /// Resolve a console inside a data source. `Default` is created on first
    /// access if the data source (owned by `uid`) has none.
    pub async fn resolve(
        &self,
        data_source_id: i64,
        selector: ConsoleSelector,
        uid: i64,
    ) -> Result<Option<Console>, DatabaseError> {
        match selector {
            ConsoleSelector::Id(id) => {
                let console = sqlx::query_as::<_, Console>(
                    "SELECT * FROM consoles WHERE id = $1 AND data_source_id = $2 AND uid = $3",
                )
                .bind(id)
                .bind(data_source_id)
                .bind(uid)
                .fetch_optional(&self.pool)
                .await?;
                Ok(console)
            }
            ConsoleSelector::Default => self.get_or_create_default(data_source_id, uid).await,
        }
    }

    async fn get_or_create_default(
        &self,
        data_source_id: i64,
        uid: i64,
    ) -> Result<Option<Console>, DatabaseError> {
        if let Some(console) = self.find_default(data_source_id, uid).await? {
            return Ok(Some(console));
        }

        // Only inserts when the data source belongs to uid
        let created = sqlx::query_as::<_, Console>(
            r#"
            INSERT INTO consoles (uid, data_source_id, name, is_default)
            SELECT uid, id, $3, TRUE FROM data_sources WHERE id = $1 AND uid = $2
            ON CONFLICT (data_source_id) WHERE is_default DO NOTHING
            RETURNING *
            "#,
        )
        .bind(data_source_id)
        .bind(uid)
        .bind(DEFAULT_CONSOLE_NAME)
        .fetch_optional(&self.pool)
        .await?;

        match created {
            Some(console) => Ok(Some(console)),
            // lost the race to a concurrent request, or the data source isn't ours
            None => self.find_default(data_source_id, uid).await,
        }
    }

    async fn find_default(&self, data_source_id: i64, uid: i64) -> Result<Option<Console>, DatabaseError> {
        let console = sqlx::query_as::<_, Console>(
            "SELECT * FROM consoles WHERE data_source_id = $1 AND uid = $2 AND is_default",
        )
        .bind(data_source_id)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(console)
    }

    /// Create a console under an owned data source; `None` if the data source isn't ours
    pub async fn create(
        &self,
        data_source_id: i64,
        uid: i64,
        new: &NewConsole,
    ) -> Result<Option<Console>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let owned = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM data_sources WHERE id = $1 AND uid = $2 FOR UPDATE",
        )
        .bind(data_source_id)
        .bind(uid)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Ok(None);
        }

        if new.is_default {
            clear_default(&mut tx, data_source_id, uid).await?;
        }

        let console = sqlx::query_as::<_, Console>(
            r#"
            INSERT INTO consoles (uid, data_source_id, name, is_default)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(uid)
        .bind(data_source_id)
        .bind(&new.name)
        .bind(new.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(console))
    }

    pub async fn update(
        &self,
        data_source_id: i64,
        selector: ConsoleSelector,
        uid: i64,
        update: &ConsoleUpdate,
    ) -> Result<UpdateConsole, DatabaseError> {
        let Some(existing) = self.resolve(data_source_id, selector, uid).await? else {
            return Ok(UpdateConsole::NotFound);
        };
        if existing.is_default && update.is_default == Some(false) {
            return Ok(UpdateConsole::DemotesDefault);
        }

        let mut tx = self.pool.begin().await?;

        if update.is_default == Some(true) && !existing.is_default {
            clear_default(&mut tx, data_source_id, uid).await?;
        }

        let console = sqlx::query_as::<_, Console>(
            r#"
            UPDATE consoles SET
                name = COALESCE($3, name),
                console_data = COALESCE($4, console_data),
                is_default = COALESCE($5, is_default),
                updated_at = NOW()
            WHERE id = $1 AND uid = $2
            RETURNING *
            "#,
        )
        .bind(existing.id)
        .bind(uid)
        .bind(&update.name)
        .bind(&update.console_data)
        .bind(update.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(console.map_or(UpdateConsole::NotFound, UpdateConsole::Updated))
    }

    /// Overwrite the stored editor state
    pub async fn save_console_data(
        &self,
        id: i64,
        uid: i64,
        console_data: &Value,
    ) -> Result<Option<Console>, DatabaseError> {
        let console = sqlx::query_as::<_, Console>(
            r#"
            UPDATE consoles SET console_data = $3, updated_at = NOW()
            WHERE id = $1 AND uid = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(uid)
        .bind(console_data)
        .fetch_optional(&self.pool)
        .await?;
        Ok(console)
    }

    /// The default console stays; everything else is deleted outright
    pub async fn remove(
        &self,
        data_source_id: i64,
        id: i64,
        uid: i64,
    ) -> Result<RemoveConsole, DatabaseError> {
        let deleted = sqlx::query_scalar::<_, i64>(
            r#"
            DELETE FROM consoles
            WHERE id = $1 AND data_source_id = $2 AND uid = $3 AND NOT is_default
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(data_source_id)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        if deleted.is_some() {
            return Ok(RemoveConsole::Removed);
        }

        match self.resolve(data_source_id, ConsoleSelector::Id(id), uid).await? {
            Some(console) if console.is_default => Ok(RemoveConsole::IsDefault),
            Some(_) | None => Ok(RemoveConsole::NotFound),
        }
    }
}

async fn clear_default(
    tx: &mut Transaction<'_, Postgres>,
    data_source_id: i64,
    uid: i64,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE consoles SET is_default = FALSE, updated_at = NOW() WHERE data_source_id = $1 AND uid = $2 AND is_default",
    )
    .bind(data_source_id)
    .bind(uid)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
