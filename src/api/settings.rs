use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::settings::{merge_patch, seed_categories_if_unset, AppSettings};

/// GET /journal-categories. Seeds the built-in list the first time the
/// slot is read while unset.
pub async fn journal_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    {
        let conn = state.conn();
        seed_categories_if_unset(&conn)?;
    }
    Ok(Json(state.settings.load()?.journal_categories))
}

/// GET /settings. Effective settings: stored values over defaults.
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<AppSettings>, ApiError> {
    Ok(Json(state.settings.load()?))
}

/// PUT /settings. Validated patch; nothing is persisted unless every
/// field in the patch is acceptable. Returns the new effective settings.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AppSettings>, ApiError> {
    let Some(patch) = body.as_object() else {
        return Err(ApiError::BadRequest("settings patch must be an object".into()));
    };
    let mut current = state.settings.load()?;
    merge_patch(&mut current, patch).map_err(ApiError::BadRequest)?;
    state.settings.save(&current)?;
    Ok(Json(current))
}
