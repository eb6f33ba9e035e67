//! # Query proxy
//!
//! Relays a YQL query from a console to the data source's Vespa search
//! endpoint and hands back whatever Vespa answered. Nothing is cached or
//! rewritten beyond two things:
//!
//! - the endpoint is derived from the data source (`search_url` + `search_port`,
//!   path defaulting to `/search/`)
//! - a numeric `hits` parameter is clamped so a console can't pull an
//!   unbounded result set through the API
//!
//! An upstream error status is still a successful proxy call; only transport
//! failures (refused, timeout) produce `success: false` with an `error`.

pub mod vespa;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::database::models::DataSource;

pub use vespa::VespaClient;

/// What the upstream said
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request timed out")]
    Timeout,

    #[error("Failed to execute search query: {0}")]
    Transport(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Data source has no search URL configured")]
    MissingSearchUrl,

    #[error("Invalid search URL '{0}'")]
    InvalidSearchUrl(String),
}

/// Seam between the query service and the HTTP client that talks to Vespa
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, endpoint: &Url, body: &Value) -> Result<SearchResponse, SearchError>;
}

/// Result envelope returned to the console
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl QueryOutcome {
    pub fn from_result(result: Result<SearchResponse, SearchError>, elapsed_ms: u64) -> Self {
        match result {
            Ok(response) => Self {
                success: (200..300).contains(&response.status),
                status: Some(response.status),
                status_text: Some(response.status_text),
                data: Some(response.body),
                error: None,
                elapsed_ms,
            },
            Err(err) => Self {
                success: false,
                status: None,
                status_text: None,
                data: None,
                error: Some(err.to_string()),
                elapsed_ms,
            },
        }
    }
}

/// One editor parameter row
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterRow {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Parameters arrive as the editor's rows or as a plain object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QueryParameters {
    Rows(Vec<ParameterRow>),
    Object(Map<String, Value>),
}

impl Default for QueryParameters {
    fn default() -> Self {
        QueryParameters::Rows(Vec::new())
    }
}

impl QueryParameters {
    /// Flatten into a request object; rows with a blank key are dropped
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            QueryParameters::Object(map) => map,
            QueryParameters::Rows(rows) => rows
                .into_iter()
                .filter_map(|row| {
                    let key = row.key.trim();
                    (!key.is_empty()).then(|| (key.to_string(), row.value))
                })
                .collect(),
        }
    }
}

/// Vespa search endpoint for a data source
pub fn search_endpoint(data_source: &DataSource) -> Result<Url, EndpointError> {
    let raw = data_source
        .search_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(EndpointError::MissingSearchUrl)?;

    let invalid = || EndpointError::InvalidSearchUrl(raw.to_string());

    let mut url = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }

    if let Some(port) = data_source.search_port {
        let port = u16::try_from(port).map_err(|_| invalid())?;
        url.set_port(Some(port)).map_err(|_| invalid())?;
    }

    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/search/");
    }

    Ok(url)
}

/// `hits` as an integer within 0..=max_hits, or None if it isn't an integer
pub fn clamp_hits(value: &Value, max_hits: i64) -> Option<Value> {
    let hits = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    Some(Value::from(hits.clamp(0, max_hits)))
}

/// Request body sent to Vespa: the parameters, then `yql` from the editor
pub fn build_query_body(yql: &str, parameters: QueryParameters, max_hits: i64) -> Value {
    let mut body = parameters.into_map();

    if let Some(hits) = body.get("hits").and_then(|v| clamp_hits(v, max_hits)) {
        body.insert("hits".to_string(), hits);
    }

    body.insert("yql".to_string(), Value::String(yql.to_string()));
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn data_source(search_url: Option<&str>, search_port: Option<i32>) -> DataSource {
        DataSource {
            id: 1,
            uid: 1,
            name: "Data Source 1".to_string(),
            search_url: search_url.map(str::to_string),
            search_port,
            document_url: None,
            document_port: None,
            config_url: None,
            config_port: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn endpoint_applies_port_and_search_path() {
        let url = search_endpoint(&data_source(Some("http://localhost"), Some(8080))).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/search/");
    }

    #[test]
    fn endpoint_keeps_explicit_path() {
        let url = search_endpoint(&data_source(Some("https://vespa.internal/custom/search/"), None)).unwrap();
        assert_eq!(url.as_str(), "https://vespa.internal/custom/search/");
    }

    #[test]
    fn endpoint_without_port_still_gets_search_path() {
        let url = search_endpoint(&data_source(Some("http://vespa:8080"), None)).unwrap();
        assert_eq!(url.as_str(), "http://vespa:8080/search/");
    }

    #[test]
    fn endpoint_rejects_missing_or_bad_urls() {
        assert_eq!(
            search_endpoint(&data_source(None, Some(8080))).unwrap_err(),
            EndpointError::MissingSearchUrl
        );
        assert_eq!(
            search_endpoint(&data_source(Some("   "), None)).unwrap_err(),
            EndpointError::MissingSearchUrl
        );
        assert!(matches!(
            search_endpoint(&data_source(Some("localhost"), Some(8080))),
            Err(EndpointError::InvalidSearchUrl(_))
        ));
        assert!(matches!(
            search_endpoint(&data_source(Some("ftp://files"), None)),
            Err(EndpointError::InvalidSearchUrl(_))
        ));
    }

    #[test]
    fn hits_are_clamped() {
        assert_eq!(clamp_hits(&json!(10), 400), Some(json!(10)));
        assert_eq!(clamp_hits(&json!(100000), 400), Some(json!(400)));
        assert_eq!(clamp_hits(&json!("5000"), 400), Some(json!(400)));
        assert_eq!(clamp_hits(&json!(" 25 "), 400), Some(json!(25)));
        assert_eq!(clamp_hits(&json!(-3), 400), Some(json!(0)));
        assert_eq!(clamp_hits(&json!(50.0), 400), Some(json!(50)));
        assert_eq!(clamp_hits(&json!(2.5), 400), None);
        assert_eq!(clamp_hits(&json!("lots"), 400), None);
        assert_eq!(clamp_hits(&json!(null), 400), None);
    }

    #[test]
    fn body_merges_rows_and_clamps() {
        let parameters: QueryParameters = serde_json::from_value(json!([
            { "id": 1, "key": "hits", "value": "1000" },
            { "id": 2, "key": "ranking", "value": "bm25" },
            { "id": 3, "key": "", "value": "ignored" },
            { "id": 4, "key": "yql", "value": "select * from other" }
        ]))
        .unwrap();

        let body = build_query_body("select * from music where true", parameters, 400);
        assert_eq!(
            body,
            json!({
                "hits": 400,
                "ranking": "bm25",
                "yql": "select * from music where true"
            })
        );
    }

    #[test]
    fn body_accepts_object_parameters() {
        let parameters: QueryParameters =
            serde_json::from_value(json!({ "timeout": "5s", "hits": 3 })).unwrap();
        let body = build_query_body("select * from sources * where true", parameters, 400);
        assert_eq!(body["timeout"], "5s");
        assert_eq!(body["hits"], 3);
        assert_eq!(body["yql"], "select * from sources * where true");
    }

    #[test]
    fn non_numeric_hits_pass_through() {
        let parameters: QueryParameters = serde_json::from_value(json!({ "hits": "many" })).unwrap();
        let body = build_query_body("select * from a where true", parameters, 400);
        assert_eq!(body["hits"], "many");
    }

    #[test]
    fn outcome_serialization() {
        let ok = QueryOutcome::from_result(
            Ok(SearchResponse {
                status: 400,
                status_text: "Bad Request".to_string(),
                body: json!({ "root": { "errors": [] } }),
            }),
            12,
        );
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["status"], 400);
        assert_eq!(value["statusText"], "Bad Request");
        assert_eq!(value["elapsedMs"], 12);
        assert!(value.get("error").is_none());

        let failed = QueryOutcome::from_result(Err(SearchError::Timeout), 30000);
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Search request timed out");
        assert!(value.get("data").is_none());
    }
}
