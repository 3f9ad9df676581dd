mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{empty_request, json_request, raw_request, TestApp};
use event_media_kit::entities::session::{self, Entity as Session};
use event_media_kit::services::auth;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::json;

async fn seed_user(app: &TestApp) {
    auth::create_user(&app.state.db, "alice", "alice@example.com", "old-pass")
        .await
        .unwrap();
}

async fn login(app: &TestApp, username: &str, password: &str) -> common::TestResponse {
    app.send(json_request(
        "POST",
        "/login/",
        &json!({ "username": username, "password": password }),
    ))
    .await
}

fn with_header(method: &str, uri: &str, name: header::HeaderName, value: String) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(name, value)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_login_issues_session_token_and_cookie() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = login(&app, "alice", "old-pass").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["username"], "alice");
    let token = response.body["token"].as_str().unwrap();
    assert!(!token.is_empty());

    let cookies = response.set_cookies();
    assert!(cookies
        .iter()
        .any(|c| c.starts_with(&format!("sessionid={}", token)) && c.contains("HttpOnly")));
}

#[tokio::test]
async fn test_login_failures() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = login(&app, "alice", "nope").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid credentials");

    let response = login(&app, "bob", "old-pass").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request("POST", "/login/", &json!({ "username": "alice" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .send(raw_request("POST", "/login/", "application/json", "not json"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid request");
}

#[tokio::test]
async fn test_logout_requires_and_revokes_the_session() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = app.send(empty_request("POST", "/logout/")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let token = login(&app, "alice", "old-pass").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();
    let bearer = || {
        with_header(
            "POST",
            "/logout/",
            header::AUTHORIZATION,
            format!("Bearer {}", token),
        )
    };

    let response = app.send(bearer()).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "success" }));

    let response = app.send(bearer()).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let app = TestApp::new().await;
    seed_user(&app).await;
    let token = login(&app, "alice", "old-pass").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();

    let stored = Session::find()
        .filter(session::Column::TokenHash.eq(auth::hash_token(&token)))
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut expired: session::ActiveModel = stored.into();
    expired.expires_at = Set(chrono::Utc::now().naive_utc() - chrono::Duration::hours(1));
    expired.update(&app.state.db).await.unwrap();

    let response = app
        .send(with_header(
            "POST",
            "/logout/",
            header::AUTHORIZATION,
            format!("Bearer {}", token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(auth::resolve_session(&app.state.db, &token)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_logout_accepts_the_session_cookie() {
    let app = TestApp::new().await;
    seed_user(&app).await;
    let token = login(&app, "alice", "old-pass").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(with_header(
            "POST",
            "/logout/",
            header::COOKIE,
            format!("sessionid={}", token),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    // the browser is told to drop the cookie
    assert!(response
        .set_cookies()
        .iter()
        .any(|c| c.starts_with("sessionid=;") && c.contains("Max-Age=0")));
}

#[tokio::test]
async fn test_change_password_with_correct_old_password() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = app
        .send(json_request(
            "POST",
            "/change-password/",
            &json!({ "username": "alice", "old_password": "old-pass", "new_password": "new-pass" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "status": "success" }));

    assert_eq!(login(&app, "alice", "new-pass").await.status, StatusCode::OK);
    assert_eq!(
        login(&app, "alice", "old-pass").await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_change_password_with_wrong_old_password_keeps_the_old_one() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = app
        .send(json_request(
            "POST",
            "/change-password/",
            &json!({ "username": "alice", "old_password": "guess", "new_password": "new-pass" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Invalid old password");

    assert_eq!(login(&app, "alice", "old-pass").await.status, StatusCode::OK);
    assert_eq!(
        login(&app, "alice", "new-pass").await.status,
        StatusCode::UNAUTHORIZED
    );

    let response = app
        .send(json_request(
            "POST",
            "/change-password/",
            &json!({ "username": "alice" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_user_matches_name_and_email() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let response = app
        .send(json_request(
            "POST",
            "/check-user/",
            &json!({ "user_name": "alice", "email": "alice@example.com" }),
        ))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "exists": true, "user": { "user_name": "alice", "email": "alice@example.com" } })
    );

    let response = app
        .send(json_request(
            "POST",
            "/check-user/",
            &json!({ "user_name": "alice", "email": "other@example.com" }),
        ))
        .await;
    assert_eq!(response.body, json!({ "exists": false }));

    let response = app
        .send(json_request("POST", "/check-user/", &json!({ "user_name": "alice", "email": "" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Username and email are required");
}

#[tokio::test]
async fn test_csrf_token_is_returned_and_set_as_cookie() {
    let app = TestApp::new().await;

    let response = app.send(empty_request("GET", "/get-csrf-token/")).await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["csrfToken"].as_str().unwrap();
    assert!(token.len() >= 32);
    assert!(response
        .set_cookies()
        .iter()
        .any(|c| c.starts_with(&format!("csrftoken={}", token))));
}

#[tokio::test]
async fn test_duplicate_user_is_a_conflict() {
    let app = TestApp::new().await;
    seed_user(&app).await;

    let err = auth::create_user(&app.state.db, "alice2", "alice@example.com", "pw")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}
