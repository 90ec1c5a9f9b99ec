//! End-to-end API tests driving the full router

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use storyhouse::config::Args;
use storyhouse::db::Database;
use storyhouse::uploads::ImageStore;
use storyhouse::{create_router, AppState, SharedState};

async fn test_app() -> (Router, SharedState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let args = Args {
        listen: "127.0.0.1:0".parse().unwrap(),
        database_path: dir.path().join("test.db"),
        upload_dir: dir.path().join("uploads"),
        public_url: None,
        jwt_secret: Some("test-secret".to_string()),
        jwt_expiry_seconds: 3600,
        dev_mode: true,
        log_level: "warn".to_string(),
    };

    let db = Database::open_in_memory().unwrap();
    let images = ImageStore::new(&args.upload_dir).await.unwrap();
    let state = Arc::new(AppState::new(args, db, images));

    (create_router(Arc::clone(&state)), state, dir)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

async fn register(app: &Router, username: &str, password: &str, name: &str, age: i64) -> StatusCode {
    let (status, _) = send(
        app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": username, "password": password, "name": name, "age": age })),
    )
    .await;
    status
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_work(app: &Router, token: &str, title: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/notes",
        Some(token),
        Some(json!({
            "title": title,
            "content": "chapter text",
            "category": "fantasy",
            "image": "",
            "description": "a story"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn registration_rejects_duplicates() {
    let (app, _state, _dir) = test_app().await;

    assert_eq!(register(&app, "alice", "pw1", "Alice", 30).await, StatusCode::CREATED);
    assert_eq!(register(&app, "alice", "pw2", "Alice Two", 25).await, StatusCode::BAD_REQUEST);

    // Check endpoint agrees
    let (status, body) = send(
        &app,
        Method::POST,
        "/check-username",
        None,
        Some(json!({ "username": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["exists"], json!(true));

    let (status, body) = send(
        &app,
        Method::POST,
        "/check-username",
        None,
        Some(json!({ "username": "fresh" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], json!(false));
}

#[tokio::test]
async fn registration_requires_all_fields() {
    let (app, _state, _dir) = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;

    let (wrong_pw_status, wrong_pw_body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "nobody", "password": "pw1" })),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body, unknown_body);

    // And a correct login succeeds
    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["name"], json!("Alice"));
    assert_eq!(body["age"], json!(30));
}

#[tokio::test]
async fn ownership_rules_for_update_and_delete() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    register(&app, "bob", "pw2", "Bob", 28).await;
    let alice = login(&app, "alice", "pw1").await;
    let bob = login(&app, "bob", "pw2").await;

    let work = create_work(&app, &alice, "Embers").await;
    let update_body = json!({
        "title": "Stolen", "content": "", "category": "", "image": "", "description": ""
    });

    // Update: non-owner and missing work both answer 403
    let (status, _) = send(&app, Method::PUT, &format!("/notes/{work}"), Some(&bob), Some(update_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::PUT, "/notes/9999", Some(&bob), Some(update_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Delete distinguishes: missing is 404, non-owned is 403
    let (status, _) = send(&app, Method::DELETE, "/notes/9999", Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, &format!("/notes/{work}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Owner can update, then delete
    let (status, _) = send(&app, Method::PUT, &format!("/notes/{work}"), Some(&alice), Some(update_body)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/notes/{work}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    // And the work is gone from the listing
    let (status, body) = send(&app, Method::GET, "/notes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn mutations_require_a_token() {
    let (app, _state, _dir) = test_app().await;

    let (status, _) = send(&app, Method::POST, "/notes", None, Some(json!({ "title": "X" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/users/me", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn episode_numbers_are_sequential() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    let alice = login(&app, "alice", "pw1").await;
    let work = create_work(&app, &alice, "Embers").await;

    for expected in 1..=3 {
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/episode",
            None,
            Some(json!({ "workId": work, "content": format!("chapter {expected}") })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["episodeNumber"], json!(expected));
        assert!(body["createdAt"].as_str().is_some());
    }

    // Missing content is a 400
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/episode",
        None,
        Some(json!({ "workId": work })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_view_counts_and_nests() {
    let (app, state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    register(&app, "reader", "pw2", "Reader", 22).await;
    let alice = login(&app, "alice", "pw1").await;
    let reader = login(&app, "reader", "pw2").await;
    let work = create_work(&app, &alice, "Embers").await;

    send(
        &app,
        Method::POST,
        "/api/episode",
        None,
        Some(json!({ "workId": work, "content": "chapter one" })),
    )
    .await;

    // Give the reader a nickname and seed comments out of order
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&reader),
        Some(json!({ "nickname": "bookworm" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    state
        .db
        .with_conn(|conn| {
            let episode_id: i64 =
                conn.query_row("SELECT id FROM episodes WHERE work_id = ?", [work], |r| r.get(0))?;
            let reader_id: i64 =
                conn.query_row("SELECT id FROM users WHERE username = 'reader'", [], |r| r.get(0))?;
            storyhouse::db::comments::insert_comment_at(
                conn, episode_id, reader_id, "second", "2026-02-01 10:00:00",
            )?;
            storyhouse::db::comments::insert_comment_at(
                conn, episode_id, reader_id, "first", "2026-01-01 10:00:00",
            )?;
            Ok(())
        })
        .unwrap();

    // First read
    let (status, first) = send(&app, Method::GET, &format!("/notes/{work}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    // Second read: views advance by exactly one
    let (_, second) = send(&app, Method::GET, &format!("/notes/{work}"), None, None).await;
    assert_eq!(
        second["views"].as_i64().unwrap(),
        first["views"].as_i64().unwrap() + 1
    );

    // Episodes nested with comments oldest-first, nicknames joined
    let episodes = second["episodes"].as_array().unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0]["episodeNumber"], json!(1));
    let comments = episodes[0]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], json!("first"));
    assert_eq!(comments[1]["content"], json!("second"));
    assert_eq!(comments[0]["authorNickname"], json!("bookworm"));

    // Missing works are 404 (after the blind counter bump)
    let (status, _) = send(&app, Method::GET, "/notes/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn likes_raise_counter_by_exactly_k() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    register(&app, "reader", "pw2", "Reader", 22).await;
    let alice = login(&app, "alice", "pw1").await;
    let reader = login(&app, "reader", "pw2").await;
    let work = create_work(&app, &alice, "Embers").await;

    for _ in 0..3 {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/notes/{work}/like"),
            Some(&reader),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, detail) = send(&app, Method::GET, &format!("/notes/{work}"), None, None).await;
    assert_eq!(detail["likes"], json!(3));

    // Liking a missing work is 404
    let (status, _) = send(&app, Method::POST, "/notes/9999/like", Some(&reader), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn best9_orders_by_likes() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    let alice = login(&app, "alice", "pw1").await;

    let quiet = create_work(&app, &alice, "Quiet").await;
    let popular = create_work(&app, &alice, "Popular").await;
    for _ in 0..2 {
        send(&app, Method::POST, &format!("/notes/{popular}/like"), Some(&alice), None).await;
    }

    let (status, body) = send(&app, Method::GET, "/best9", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let works = body.as_array().unwrap();
    assert_eq!(works[0]["id"].as_i64().unwrap(), popular);
    assert_eq!(works[1]["id"].as_i64().unwrap(), quiet);
}

#[tokio::test]
async fn dashboard_composes_four_reads() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    register(&app, "reader", "pw2", "Reader", 22).await;
    let alice = login(&app, "alice", "pw1").await;
    let reader = login(&app, "reader", "pw2").await;
    let work = create_work(&app, &alice, "Embers").await;

    // Reader views (with token, so the event is recorded) and likes
    send(&app, Method::GET, &format!("/notes/{work}"), Some(&reader), None).await;
    send(&app, Method::POST, &format!("/notes/{work}/like"), Some(&reader), None).await;

    let (status, body) = send(&app, Method::GET, "/users/me", Some(&reader), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["username"], json!("reader"));
    assert_eq!(body["profile"]["name"], json!("Reader"));

    let recent = body["recentViews"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["title"], json!("Embers"));
    assert_eq!(recent[0]["author_name"], json!("Alice"));

    assert_eq!(body["likedWorks"].as_array().unwrap().len(), 1);
    assert_eq!(body["myWorks"].as_array().unwrap().len(), 0);

    // The author's dashboard lists the work under myWorks
    let (_, author_board) = send(&app, Method::GET, "/users/me", Some(&alice), None).await;
    let my_works = author_board["myWorks"].as_array().unwrap();
    assert_eq!(my_works.len(), 1);
    assert_eq!(my_works[0]["title"], json!("Embers"));
}

#[tokio::test]
async fn profile_update_semantics() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    let alice = login(&app, "alice", "pw1").await;

    // Empty name is a no-op, age zero applies, absent fields untouched
    let (status, _) = send(
        &app,
        Method::PATCH,
        "/users/me",
        Some(&alice),
        Some(json!({ "name": "", "age": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, board) = send(&app, Method::GET, "/users/me", Some(&alice), None).await;
    assert_eq!(board["profile"]["name"], json!("Alice"));
    assert_eq!(board["profile"]["age"], json!(0));
    assert_eq!(board["profile"]["username"], json!("alice"));
}

#[tokio::test]
async fn author_listing_by_exact_name() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    let alice = login(&app, "alice", "pw1").await;
    create_work(&app, &alice, "Embers").await;

    let (status, body) = send(&app, Method::GET, "/author/Alice/works", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorName"], json!("Alice"));
    let works = body["works"].as_array().unwrap();
    assert_eq!(works.len(), 1);
    assert!(works[0].get("cover_image").is_some());

    let (status, _) = send(&app, Method::GET, "/author/Nobody/works", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_flow() {
    let (app, _state, _dir) = test_app().await;
    register(&app, "alice", "pw1", "Alice", 30).await;
    let alice = login(&app, "alice", "pw1").await;

    // Unauthenticated upload is rejected
    let request = multipart_request("/upload", None, "cover.png", b"png-bytes");
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Disallowed extension is a 400
    let request = multipart_request("/upload", Some(&alice), "malware.exe", b"bytes");
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Allowed upload returns a URL
    let request = multipart_request("/upload", Some(&alice), "cover.png", b"png-bytes");
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["url"], json!("/uploads/cover.png"));

    // And the file serves back
    let (status, _) = send(&app, Method::GET, "/uploads/cover.png", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/uploads/missing.png", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn multipart_request(
    uri: &str,
    token: Option<&str>,
    filename: &str,
    data: &[u8],
) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder.body(Body::from(body)).unwrap()
}
