// handlers/protected/console/console_put.rs - PUT /data-source/:dsid/console/:id

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UpdateConsole;
use crate::types::ConsoleSelector;
use crate::validate;

use super::parse_update;

const DEFAULT_REQUIRED: &str =
    "The default console cannot be unset; make another console the default instead";

/// Rename, save editor state, or promote to default. The web client calls
/// this for auto-save with only `console_data` set.
pub async fn console_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((data_source_id, id)): Path<(String, String)>,
    ApiJson(body): ApiJson<Value>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;
    let selector = validate::console_selector(&id)?;
    let update = parse_update(&body)?;

    if selector == ConsoleSelector::Default && update.is_default == Some(false) {
        return Err(ApiError::unprocessable_entity(DEFAULT_REQUIRED));
    }

    match state
        .consoles()
        .update(data_source_id, selector, auth.uid, &update)
        .await?
    {
        UpdateConsole::Updated(console) => Ok(ApiResponse::data("console", console)),
        UpdateConsole::DemotesDefault => Err(ApiError::unprocessable_entity(DEFAULT_REQUIRED)),
        UpdateConsole::NotFound => Err(ApiError::not_found("Console not found")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::testing::{test_config, test_state};

    #[tokio::test]
    async fn default_console_cannot_be_unset() {
        let err = console_put(
            State(test_state(test_config())),
            Extension(AuthUser {
                uid: 1,
                email: "ada@example.com".to_string(),
            }),
            Path(("1".to_string(), "default".to_string())),
            ApiJson(json!({ "is_default": false })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message().starts_with("The default console cannot be unset"));
    }
}
