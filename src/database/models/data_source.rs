use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::console::ConsoleSummary;

/// Connection metadata for one Vespa deployment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataSource {
    pub id: i64,
    pub uid: i64,
    pub name: String,
    pub search_url: Option<String>,
    pub search_port: Option<i32>,
    pub document_url: Option<String>,
    pub document_port: Option<i32>,
    pub config_url: Option<String>,
    pub config_port: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing row: the data source plus its consoles for the sidebar
#[derive(Debug, Clone, Serialize)]
pub struct DataSourceWithConsoles {
    #[serde(flatten)]
    pub data_source: DataSource,
    pub consoles: Vec<ConsoleSummary>,
}

#[derive(Debug, Clone)]
pub struct NewDataSource {
    pub name: String,
    pub search_url: Option<String>,
    pub search_port: Option<i32>,
    pub document_url: Option<String>,
    pub document_port: Option<i32>,
    pub config_url: Option<String>,
    pub config_port: Option<i32>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct DataSourceUpdate {
    pub name: Option<String>,
    pub search_url: Option<String>,
    pub search_port: Option<i32>,
    pub document_url: Option<String>,
    pub document_port: Option<i32>,
    pub config_url: Option<String>,
    pub config_port: Option<i32>,
}

impl DataSourceUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.search_url.is_none()
            && self.search_port.is_none()
            && self.document_url.is_none()
            && self.document_port.is_none()
            && self.config_url.is_none()
            && self.config_port.is_none()
    }
}
