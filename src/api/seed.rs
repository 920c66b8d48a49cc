use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::seed;

/// POST /seed-data. Best-effort idempotent bulk seed: each collection is
/// filled only if currently empty, non-empty ones are skipped.
pub async fn seed_data(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let conn = state.conn();
    let report = seed::seed_if_empty(&conn)?;
    tracing::info!(
        users = report.users_seeded,
        journals = report.journals_seeded,
        categories = report.categories_seeded,
        "seed-data completed"
    );
    Ok(Json(json!({
        "message": "Data seeding process completed.",
        "seeded": {
            "users": report.users_seeded,
            "journals": report.journals_seeded,
            "journalCategories": report.categories_seeded,
        }
    })))
}
