use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::{SearchBackend, SearchError, SearchResponse};

/// reqwest-backed client for Vespa's `/search/` API
#[derive(Clone)]
pub struct VespaClient {
    http: reqwest::Client,
}

impl VespaClient {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("search-console/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SearchBackend for VespaClient {
    async fn search(&self, endpoint: &Url, body: &Value) -> Result<SearchResponse, SearchError> {
        let response = self
            .http
            .post(endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;

        // Vespa answers JSON; proxies in front of it may not
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        tracing::debug!("Search {} answered {}", endpoint, status);

        Ok(SearchResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Transport(err.to_string())
    }
}
