use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use jurnald::api::{router, AppState};
use jurnald::db;

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let conn = db::open_db(&dir.path().join("jurnal.sqlite3")).expect("open db");
    (router(AppState::new(conn)), dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn login(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/login",
        Some(json!({ "identifier": identifier, "password": password })),
    )
    .await
}

#[tokio::test]
async fn each_natural_key_resolves_its_role() {
    let (app, _dir) = test_app();
    let _ = send(&app, "GET", "/users", None).await; // seed accounts

    let (status, user) = login(&app, "001", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "Siswa");
    assert_eq!(user["name"], "Budi Santoso");
    assert!(user.get("password").is_none(), "login must strip password");

    let (status, user) = login(&app, "198501012010012001", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "Guru");

    let (status, user) = login(&app, "3301011010800001", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "Orang Tua");
    assert_eq!(user["childId"], "student-1");

    let (status, user) = login(&app, "ADMIN001", "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["role"], "Admin");
}

#[tokio::test]
async fn wrong_password_and_unknown_identifier_both_401() {
    let (app, _dir) = test_app();
    let _ = send(&app, "GET", "/users", None).await;

    let (status, body) = login(&app, "001", "salah").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = login(&app, "999", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "no user-existence leak");
}

#[tokio::test]
async fn malformed_login_body_is_400() {
    let (app, _dir) = test_app();
    let (status, _) = send(&app, "POST", "/login", Some(json!({ "identifier": "001" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
