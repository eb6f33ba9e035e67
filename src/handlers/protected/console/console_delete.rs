// handlers/protected/console/console_delete.rs - DELETE /data-source/:dsid/console/:id

use axum::extract::{Extension, Path, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::RemoveConsole;
use crate::types::ConsoleSelector;
use crate::validate;

const DEFAULT_NOT_DELETABLE: &str = "The default console cannot be deleted";

pub async fn console_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((data_source_id, id)): Path<(String, String)>,
) -> ApiResult {
    let data_source_id = validate::data_source_id(&data_source_id)?;
    let id = match validate::console_selector(&id)? {
        ConsoleSelector::Default => return Err(ApiError::unprocessable_entity(DEFAULT_NOT_DELETABLE)),
        ConsoleSelector::Id(id) => id,
    };

    match state.consoles().remove(data_source_id, id, auth.uid).await? {
        RemoveConsole::Removed => Ok(ApiResponse::ok()),
        RemoveConsole::IsDefault => Err(ApiError::unprocessable_entity(DEFAULT_NOT_DELETABLE)),
        RemoveConsole::NotFound => Err(ApiError::not_found("Console not found")),
    }
}
