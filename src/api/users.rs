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
use crate::models::{User, UserProfile};
use crate::seed;

fn all_users(conn: &Connection) -> Result<Vec<User>, ApiError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users ORDER BY name",
        db::USER_COLUMNS
    ))?;
    let users = stmt
        .query_map([], db::user_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users.into_iter().map(User::stripped).collect())
}

fn find_user(conn: &Connection, id: &str) -> Result<Option<User>, ApiError> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?", db::USER_COLUMNS),
            [id],
            db::user_from_row,
        )
        .optional()?)
}

fn require_filled(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

fn validate_profile(profile: &UserProfile) -> Result<(), ApiError> {
    require_filled(&profile.name, "name")?;
    require_filled(&profile.email, "email")?;
    Ok(())
}

/// GET /users. Lazily seeds the fixed account list when the table is
/// empty, then returns everyone, passwords stripped, ordered by name.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let conn = state.conn();
    seed::ensure_users_seeded(&conn)?;
    Ok(Json(all_users(&conn)?))
}

/// POST /users. The id is always server-assigned; any client-sent id is
/// ignored because the payload type has no such field.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let profile: UserProfile = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid user payload: {e}")))?;
    validate_profile(&profile)?;
    match profile.password.as_deref() {
        Some(p) if !p.trim().is_empty() => {}
        _ => return Err(ApiError::BadRequest("password must not be empty".into())),
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        profile,
    };
    let conn = state.conn();
    db::upsert_user(&conn, &user)?;
    Ok((StatusCode::CREATED, Json(user.stripped())))
}

/// PUT /users. The body id is authoritative and immutable; all other
/// fields are replaced. A missing password keeps the stored one, since
/// GET never hands it out for the client to round-trip.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<User>, ApiError> {
    if body.get("id").and_then(Value::as_str).is_none() {
        return Err(ApiError::BadRequest("missing user id".into()));
    }
    let mut user: User = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid user payload: {e}")))?;
    validate_profile(&user.profile)?;

    let conn = state.conn();
    let Some(existing) = find_user(&conn, &user.id)? else {
        return Err(ApiError::NotFound("user not found".into()));
    };
    if user.profile.password.as_deref().map_or(true, |p| p.trim().is_empty()) {
        user.profile.password = existing.profile.password;
    }
    db::upsert_user(&conn, &user)?;
    Ok(Json(user.stripped()))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    id: Option<String>,
    action: Option<String>,
}

/// DELETE /users?id=... removes one user (no cascade: their journal
/// entries stay behind). DELETE /users?action=reset_application_data
/// wipes and reseeds everything instead.
pub async fn delete(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<Value>, ApiError> {
    if let Some(action) = params.action.as_deref() {
        if action != "reset_application_data" {
            return Err(ApiError::BadRequest(format!("unknown action: {action}")));
        }
        let conn = state.conn();
        seed::reset_all(&conn)?;
        tracing::info!("application data reset to seed state");
        return Ok(Json(json!({
            "message": "Application data has been reset successfully."
        })));
    }

    let Some(id) = params.id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::BadRequest("missing or invalid id".into()));
    };
    let conn = state.conn();
    let affected = conn.execute("DELETE FROM users WHERE id = ?", [&id])?;
    if affected == 0 {
        return Err(ApiError::NotFound("user not found".into()));
    }
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
