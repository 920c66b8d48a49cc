pub mod error;
mod journals;
mod login;
mod seed;
mod settings;
mod users;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rusqlite::Connection;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{self, Db};
use crate::settings::SettingsService;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub settings: SettingsService,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        let db: Db = Arc::new(Mutex::new(conn));
        AppState {
            settings: SettingsService::new(db.clone()),
            db,
        }
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        db::conn(&self.db)
    }
}

/// The whole HTTP surface. Unmatched verbs on a known route get axum's
/// 405 with an Allow header; unknown routes get a 404.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login::login))
        .route(
            "/users",
            get(users::list)
                .post(users::create)
                .put(users::update)
                .delete(users::delete),
        )
        .route(
            "/journals",
            get(journals::list)
                .post(journals::create)
                .put(journals::update)
                .delete(journals::delete),
        )
        .route("/journal-categories", get(settings::journal_categories))
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/seed-data", post(seed::seed_data))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let user_count: Option<i64> = state
        .conn()
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .ok();
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "userCount": user_count,
    }))
}
