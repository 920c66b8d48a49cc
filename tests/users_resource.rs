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

#[tokio::test]
async fn get_seeds_empty_store_once_and_strips_passwords() {
    let (app, _dir) = test_app();

    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array");
    assert_eq!(users.len(), 12);
    assert!(users.iter().all(|u| u.get("password").is_none()));
    // Ordered by name.
    assert_eq!(users[0]["name"], "Admin Sekolah");

    // A second read must not seed again.
    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("array").len(), 12);
}

#[tokio::test]
async fn create_assigns_server_id_stable_across_reads() {
    let (app, _dir) = test_app();

    let (status, created) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "id": "client-chosen",
            "name": "Dewi Anggraini",
            "role": "Siswa",
            "email": "dewi@sekolah.id",
            "password": "rahasia123",
            "nisn": "005",
            "class": "Kelas 5A",
            "teacherId": "teacher-1",
            "parentId": "parent-5"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id");
    assert!(!id.is_empty());
    assert_ne!(id, "client-chosen", "id must be server-assigned");
    assert!(created.get("password").is_none());

    let (_, body) = send(&app, "GET", "/users", None).await;
    let found = body
        .as_array()
        .expect("array")
        .iter()
        .any(|u| u["id"] == id);
    assert!(found, "created user must be readable under its id");
}

#[tokio::test]
async fn create_rejects_incomplete_payloads() {
    let (app, _dir) = test_app();

    // No role tag at all.
    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "X", "email": "x@sekolah.id", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    // Guru missing nip/subject.
    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Pak Guru",
            "role": "Guru",
            "email": "pak@sekolah.id",
            "password": "pw",
            "class": "Kelas 6"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty password.
    let (status, _) = send(
        &app,
        "POST",
        "/users",
        Some(json!({
            "name": "Admin Dua",
            "role": "Admin",
            "email": "a2@sekolah.id",
            "password": "",
            "nip": "ADMIN003"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn put_replaces_by_body_id() {
    let (app, _dir) = test_app();
    let _ = send(&app, "GET", "/users", None).await; // seed

    let (status, updated) = send(
        &app,
        "PUT",
        "/users",
        Some(json!({
            "id": "teacher-2",
            "name": "Bapak Guru Budi Raharjo",
            "role": "Guru",
            "email": "gurubudi@sekolah.id",
            "nip": "198602022011021002",
            "class": "Kelas 5B",
            "subject": "IPA"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Bapak Guru Budi Raharjo");
    assert_eq!(updated["subject"], "IPA");
    assert!(updated.get("password").is_none());

    // The omitted password must be kept: the old one still logs in.
    let (status, _) = send(
        &app,
        "POST",
        "/login",
        Some(json!({ "identifier": "198602022011021002", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        "/users",
        Some(json!({
            "id": "no-such-user",
            "name": "Ghost",
            "role": "Admin",
            "email": "ghost@sekolah.id",
            "nip": "GHOST"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Body without id is rejected outright.
    let (status, _) = send(
        &app,
        "PUT",
        "/users",
        Some(json!({ "name": "Anon", "role": "Admin", "email": "anon@sekolah.id", "nip": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_does_not_cascade_to_journal_entries() {
    let (app, _dir) = test_app();
    let _ = send(&app, "GET", "/users", None).await;
    let _ = send(&app, "GET", "/journals", None).await;

    let (status, body) = send(&app, "DELETE", "/users?id=student-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (_, journals) = send(&app, "GET", "/journals", None).await;
    let orphans = journals
        .as_array()
        .expect("array")
        .iter()
        .filter(|e| e["studentId"] == "student-1")
        .count();
    assert_eq!(orphans, 2, "entries of a deleted user stay retrievable");

    let (status, _) = send(&app, "DELETE", "/users?id=student-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/users", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
