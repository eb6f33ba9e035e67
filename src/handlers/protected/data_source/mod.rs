// handlers/protected/data_source/mod.rs - /data-source CRUD

pub mod data_source_delete;
pub mod data_source_get;
pub mod data_source_post;
pub mod data_source_put;

pub use data_source_delete::data_source_delete;
pub use data_source_get::{data_source_get, data_source_list};
pub use data_source_post::data_source_post;
pub use data_source_put::data_source_put;

use serde_json::Value;

use crate::database::models::DataSourceUpdate;
use crate::error::ApiError;
use crate::validate;

/// Connection fields shared by POST and PUT. Null, absent and blank values
/// all read as "not provided".
pub(crate) fn parse_fields(body: &Value) -> Result<DataSourceUpdate, ApiError> {
    let text = |name: &str| -> Result<Option<String>, ApiError> {
        Ok(validate::optional_string(body.get(name), name)?.filter(|s| !s.is_empty()))
    };

    Ok(DataSourceUpdate {
        name: text("name")?,
        search_url: text("search_url")?,
        search_port: validate::optional_port(body.get("search_port"), "search_port")?,
        document_url: text("document_url")?,
        document_port: validate::optional_port(body.get("document_port"), "document_port")?,
        config_url: text("config_url")?,
        config_port: validate::optional_port(body.get("config_port"), "config_port")?,
    })
}
