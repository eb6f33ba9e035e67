// handlers/protected/console/mod.rs - consoles and query execution
//
// Consoles are addressed two ways: flat (`/console/:id`) for the web client's
// lookups, and nested under their data source (`/data-source/:dsid/console/:id`)
// where `:id` may be the literal `default`.

pub mod console_delete;
pub mod console_execute;
pub mod console_get;
pub mod console_post;
pub mod console_put;

pub use console_delete::console_delete;
pub use console_execute::console_execute;
pub use console_get::{console_get, console_get_by_id, console_list, console_list_for_data_source};
pub use console_post::console_post;
pub use console_put::console_put;

use serde_json::Value;

use crate::database::models::ConsoleUpdate;
use crate::error::ApiError;
use crate::validate;

pub(crate) fn parse_update(body: &Value) -> Result<ConsoleUpdate, ApiError> {
    let name = match validate::optional_string(body.get("name"), "name")? {
        Some(name) if name.is_empty() => {
            return Err(ApiError::unprocessable_entity("'name' cannot be empty"));
        }
        other => other,
    };

    let console_data = match body.get("console_data") {
        None | Some(Value::Null) => None,
        Some(data @ Value::Object(_)) => Some(data.clone()),
        Some(_) => {
            return Err(ApiError::unprocessable_entity(
                "Invalid parameter, expected 'console_data' to be an object",
            ));
        }
    };

    Ok(ConsoleUpdate {
        name,
        console_data,
        is_default: optional_bool(body.get("is_default"), "is_default")?,
    })
}

pub(crate) fn optional_bool(value: Option<&Value>, name: &str) -> Result<Option<bool>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ApiError::unprocessable_entity(format!(
            "Invalid parameter, expected '{}' to be a boolean",
            name
        ))),
    }
}
