use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

pub const DEFAULT_CONSOLE_NAME: &str = "Default";

/// A saved query console. `console_data` is owned by the web client
/// (editor text, parameters, panel sizes, last response).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Console {
    pub id: i64,
    pub uid: i64,
    pub data_source_id: i64,
    pub name: String,
    pub is_default: bool,
    pub console_data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsoleSummary {
    pub id: i64,
    pub data_source_id: i64,
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct NewConsole {
    pub name: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConsoleUpdate {
    pub name: Option<String>,
    pub console_data: Option<Value>,
    pub is_default: Option<bool>,
}
