use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::db;
use crate::models::{EntryStatus, JournalEntry, NewJournalEntry};
use crate::seed;

fn all_entries(conn: &Connection) -> Result<Vec<JournalEntry>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM journals ORDER BY date DESC, submission_time DESC",
        db::JOURNAL_COLUMNS
    ))?;
    let entries = stmt
        .query_map([], db::journal_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

fn entry_exists(conn: &Connection, id: &str) -> Result<bool, ApiError> {
    Ok(conn
        .query_row("SELECT 1 FROM journals WHERE id = ?", [id], |r| {
            r.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

fn require_filled(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// GET /journals. Seeds the fixed starter entries iff the table is
/// empty, then returns everything newest-first.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let conn = state.conn();
    seed::ensure_journals_seeded(&conn)?;
    Ok(Json(all_entries(&conn)?))
}

/// POST /journals. Date, submission time and status are server-stamped;
/// whatever the client sends for them never reaches the store.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    let new_entry: NewJournalEntry = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid journal payload: {e}")))?;
    require_filled(&new_entry.student_id, "studentId")?;
    require_filled(&new_entry.category, "category")?;
    require_filled(&new_entry.activity, "activity")?;

    let now = chrono::Local::now();
    let entry = JournalEntry {
        id: Uuid::new_v4().to_string(),
        student_id: new_entry.student_id,
        date: now.format("%Y-%m-%d").to_string(),
        submission_time: now.format("%H:%M:%S").to_string(),
        category: new_entry.category,
        activity: new_entry.activity,
        attendance: new_entry.attendance,
        behavior_note: new_entry.behavior_note,
        mood: new_entry.mood,
        reflection: new_entry.reflection,
        teacher_comment: None,
        status: EntryStatus::Pending,
    };
    let conn = state.conn();
    db::upsert_journal(&conn, &entry)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /journals. Replace semantics over the body id; the body carries
/// the full entity the client last read.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<JournalEntry>, ApiError> {
    if body.get("id").and_then(Value::as_str).is_none() {
        return Err(ApiError::BadRequest("missing journal id".into()));
    }
    let entry: JournalEntry = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid journal payload: {e}")))?;

    let conn = state.conn();
    if !entry_exists(&conn, &entry.id)? {
        return Err(ApiError::NotFound("journal not found".into()));
    }
    db::upsert_journal(&conn, &entry)?;
    Ok(Json(entry))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    id: Option<String>,
}

/// DELETE /journals?id=... Fire-and-forget: no existence check, so
/// deleting an already absent entry still reports success. Unlike the
/// users resource, which 404s.
pub async fn delete(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Value>, ApiError> {
    let Some(id) = params.id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::BadRequest("missing or invalid id".into()));
    };
    let conn = state.conn();
    conn.execute("DELETE FROM journals WHERE id = ?", [&id])?;
    Ok(Json(json!({ "message": "Journal deleted successfully" })))
}
