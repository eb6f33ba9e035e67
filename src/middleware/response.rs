use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::types::Pagination;

/// Success body. Data is written at the top level of the JSON object,
/// e.g. `{"dataSource": {...}}`, never wrapped in a generic envelope.
#[derive(Debug)]
pub struct ApiResponse {
    pub body: Value,
    pub status_code: StatusCode,
}

impl ApiResponse {
    /// `{"status":"ok"}`
    pub fn ok() -> Self {
        Self::from_value(json!({ "status": "ok" }))
    }

    /// `{"status":"ok","message":...}`
    pub fn message(message: impl Into<String>) -> Self {
        Self::from_value(json!({ "status": "ok", "message": message.into() }))
    }

    /// `{key: data}`
    pub fn data<T: Serialize>(key: &str, data: T) -> Self {
        let mut body = Map::new();
        body.insert(key.to_string(), to_value(data));
        Self::from_value(Value::Object(body))
    }

    /// `{"pagination": {...}, "items": [...]}`
    pub fn list<T: Serialize>(items: Vec<T>, pagination: Pagination) -> Self {
        Self::from_value(json!({
            "pagination": pagination,
            "items": to_value(items),
        }))
    }

    pub fn created(mut self) -> Self {
        self.status_code = StatusCode::CREATED;
        self
    }

    fn from_value(body: Value) -> Self {
        Self {
            body,
            status_code: StatusCode::OK,
        }
    }
}

fn to_value<T: Serialize>(data: T) -> Value {
    serde_json::to_value(data).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response data: {}", e);
        Value::Null
    })
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status_code, Json(self.body)).into_response()
    }
}

pub type ApiResult = Result<ApiResponse, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_written_flat() {
        let response = ApiResponse::data("console", json!({ "id": 3, "name": "Default" }));
        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, json!({ "console": { "id": 3, "name": "Default" } }));
    }

    #[test]
    fn list_carries_pagination() {
        let response = ApiResponse::list(
            vec![json!({ "id": 1 }), json!({ "id": 2 })],
            Pagination { limit: 100, offset: 0, total: 2 },
        );
        assert_eq!(response.body["pagination"], json!({ "limit": 100, "offset": 0, "total": 2 }));
        assert_eq!(response.body["items"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn created_sets_201() {
        let response = ApiResponse::data("dataSource", json!({ "id": 1 })).created();
        assert_eq!(response.status_code, StatusCode::CREATED);
        assert_eq!(ApiResponse::message("Logged out").body["message"], "Logged out");
    }
}
