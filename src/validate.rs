//! Request input checks shared by the handlers.
//!
//! Missing or malformed body parameters are 422s; malformed path ids are 400s.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::ConsoleSelector;

pub fn require_string(value: Option<&str>, name: &str) -> Result<String, ApiError> {
    let value = value.ok_or_else(|| missing(name))?;
    if value.trim().is_empty() {
        return Err(ApiError::unprocessable_entity(format!("'{}' cannot be empty", name)));
    }
    Ok(value.to_string())
}

pub fn require_email(value: Option<&str>, name: &str) -> Result<String, ApiError> {
    let value = value.ok_or_else(|| missing(name))?.trim();
    if !is_email(value) {
        return Err(ApiError::unprocessable_entity(format!("Invalid email address '{}'", value)));
    }
    Ok(value.to_string())
}

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Accepts an integer or an integer string in 1..=65535; null/absent is None.
pub fn optional_port(value: Option<&Value>, name: &str) -> Result<Option<i32>, ApiError> {
    let invalid = || {
        ApiError::unprocessable_entity(format!(
            "Invalid parameter, expected '{}' to be an integer between 1 and 65535",
            name
        ))
    };

    let port = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(Value::Number(n)) => n.as_i64().ok_or_else(invalid)?,
        Some(_) => return Err(invalid()),
    };

    if !(1..=65535).contains(&port) {
        return Err(invalid());
    }
    Ok(Some(port as i32))
}

pub fn optional_string(value: Option<&Value>, name: &str) -> Result<Option<String>, ApiError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(ApiError::unprocessable_entity(format!(
            "Invalid parameter, expected '{}' to be a string, got {}",
            name, other
        ))),
    }
}

pub fn data_source_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid data source ID"))
}

pub fn console_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Invalid console ID"))
}

pub fn console_selector(raw: &str) -> Result<ConsoleSelector, ApiError> {
    if raw == "default" {
        return Ok(ConsoleSelector::Default);
    }
    console_id(raw).map(ConsoleSelector::Id)
}

fn missing(name: &str) -> ApiError {
    ApiError::unprocessable_entity(format!("Missing required parameter '{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emails() {
        assert!(require_email(Some("ada@example.com"), "email").is_ok());
        assert_eq!(require_email(Some(" ada@example.com "), "email").unwrap(), "ada@example.com");
        assert!(require_email(Some("ada@example"), "email").is_err());
        assert!(require_email(Some("ada@.com"), "email").is_err());
        assert!(require_email(Some("a da@example.com"), "email").is_err());
        assert!(require_email(Some("@example.com"), "email").is_err());
        assert!(require_email(Some("ada@@example.com"), "email").is_err());

        let err = require_email(None, "email").unwrap_err();
        assert_eq!(err.message(), "Missing required parameter 'email'");
    }

    #[test]
    fn strings() {
        assert_eq!(require_string(Some("Prod"), "name").unwrap(), "Prod");
        assert_eq!(require_string(Some("  "), "name").unwrap_err().message(), "'name' cannot be empty");
        assert!(optional_string(Some(&json!(3)), "search_url").is_err());
        assert_eq!(optional_string(Some(&Value::Null), "search_url").unwrap(), None);
    }

    #[test]
    fn ports() {
        assert_eq!(optional_port(None, "search_port").unwrap(), None);
        assert_eq!(optional_port(Some(&json!(null)), "search_port").unwrap(), None);
        assert_eq!(optional_port(Some(&json!("")), "search_port").unwrap(), None);
        assert_eq!(optional_port(Some(&json!(8080)), "search_port").unwrap(), Some(8080));
        assert_eq!(optional_port(Some(&json!("19071")), "config_port").unwrap(), Some(19071));
        assert!(optional_port(Some(&json!("80a")), "search_port").is_err());
        assert!(optional_port(Some(&json!(0)), "search_port").is_err());
        assert!(optional_port(Some(&json!(70000)), "search_port").is_err());
        assert!(optional_port(Some(&json!(80.5)), "search_port").is_err());
        assert!(optional_port(Some(&json!(true)), "search_port").is_err());
    }

    #[test]
    fn path_ids() {
        assert_eq!(data_source_id("42").unwrap(), 42);
        assert_eq!(data_source_id("abc").unwrap_err().message(), "Invalid data source ID");
        assert!(data_source_id("-1").is_err());
        assert_eq!(console_selector("default").unwrap(), ConsoleSelector::Default);
        assert_eq!(console_selector("7").unwrap(), ConsoleSelector::Id(7));
        assert_eq!(console_selector("nope").unwrap_err().message(), "Invalid console ID");
    }
}
