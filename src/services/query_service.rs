use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use thiserror::Error;

use crate::database::models::DataSource;
use crate::database::DatabaseError;
use crate::search::{self, EndpointError, QueryOutcome, QueryParameters, SearchBackend};
use crate::services::{ConsoleService, DataSourceService};
use crate::types::ConsoleSelector;

/// Body of `POST /data-source/:id/console/:id/execute`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteRequest {
    pub yql: Option<String>,
    #[serde(default)]
    pub parameters: Option<QueryParameters>,
    pub console_data: Option<Map<String, Value>>,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Data source not found")]
    DataSourceNotFound,

    #[error("Console not found")]
    ConsoleNotFound,

    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Runs a console's query through the search backend and records the response
pub struct QueryService {
    pool: PgPool,
    backend: Arc<dyn SearchBackend>,
    max_hits: i64,
}

impl QueryService {
    pub fn new(pool: PgPool, backend: Arc<dyn SearchBackend>, max_hits: i64) -> Self {
        Self {
            pool,
            backend,
            max_hits,
        }
    }

    /// `yql` must already be validated as non-empty
    pub async fn execute(
        &self,
        uid: i64,
        data_source_id: i64,
        selector: ConsoleSelector,
        yql: &str,
        request: ExecuteRequest,
    ) -> Result<QueryOutcome, QueryError> {
        let data_source = DataSourceService::new(self.pool.clone())
            .get(data_source_id, uid)
            .await?
            .ok_or(QueryError::DataSourceNotFound)?;

        let consoles = ConsoleService::new(self.pool.clone());
        let console = consoles
            .resolve(data_source_id, selector, uid)
            .await?
            .ok_or(QueryError::ConsoleNotFound)?;

        let parameters = request.parameters.unwrap_or_default();
        let outcome = self.run(&data_source, yql, parameters).await?;
        tracing::debug!("User {} ran console {}", uid, console.id);

        let stored = match &console.console_data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        let console_data = record_last_response(request.console_data.unwrap_or(stored), &outcome);
        consoles.save_console_data(console.id, uid, &console_data).await?;

        Ok(outcome)
    }

    /// Sends one query to the data source's search endpoint, timing the call.
    /// Nothing is read from or written to the database here.
    pub async fn run(
        &self,
        data_source: &DataSource,
        yql: &str,
        parameters: QueryParameters,
    ) -> Result<QueryOutcome, EndpointError> {
        let endpoint = search::search_endpoint(data_source)?;
        let body = search::build_query_body(yql, parameters, self.max_hits);

        let started = Instant::now();
        let result = self.backend.search(&endpoint, &body).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::info!(
                "Data source {} query against {} -> {} in {}ms",
                data_source.id, endpoint, response.status, elapsed_ms
            ),
            Err(e) => tracing::warn!(
                "Data source {} query against {} -> failed after {}ms: {}",
                data_source.id, endpoint, elapsed_ms, e
            ),
        }

        Ok(QueryOutcome::from_result(result, elapsed_ms))
    }
}

/// Console state to persist after a run: the editor's state plus the
/// upstream body as `lastResponse` whenever the upstream answered
pub fn record_last_response(mut console_data: Map<String, Value>, outcome: &QueryOutcome) -> Value {
    if let Some(data) = &outcome.data {
        console_data.insert("lastResponse".to_string(), data.clone());
    }
    Value::Object(console_data)
}
