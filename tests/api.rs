mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{body_json, build_app, json_request};

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(json_request(method, path, token, body))
        .await
        .expect("request failed");
    let status = response.status();
    (status, body_json(response).await)
}

async fn login(app: &Router, username: &str, password: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        Method::POST,
        "/authenticate",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (
        body["token"].as_str().expect("token").to_string(),
        body["user"]["id"].as_i64().expect("user id"),
    )
}

#[tokio::test]
async fn test_alice_scenario() {
    let app = build_app().await;
    let (token, _) = login(&app, "alice", "pw1").await;
    let token = Some(token.as_str());

    let (status, created) = send(
        &app,
        Method::POST,
        "/todos",
        token,
        Some(json!({ "task": "buy milk" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (_, todos) = send(&app, Method::GET, "/todos", token, None).await;
    assert_eq!(todos.as_array().unwrap().len(), 1);
    assert_eq!(todos[0]["task"], "buy milk");
    assert_eq!(todos[0]["completed"], false);

    let (status, toggled) = send(&app, Method::POST, &format!("/todos/{id}/toggle"), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(toggled["completed"], true);

    let (_, done) = send(&app, Method::GET, "/todos?completed=true", token, None).await;
    assert_eq!(done.as_array().unwrap().len(), 1);
    assert_eq!(done[0]["id"], id);

    let (_, open) = send(&app, Method::GET, "/todos?completed=false", token, None).await;
    assert!(open.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_response_never_contains_hash() {
    let app = build_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/authenticate",
        None,
        Some(json!({ "username": "alice", "password": "pw1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());
    assert!(!body.to_string().contains("argon2"));
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let app = build_app().await;
    let (_, alice_id) = login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/authenticate",
        None,
        Some(json!({ "username": "alice", "password": "wrongpw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let (_, again) = login(&app, "alice", "pw1").await;
    assert_eq!(again, alice_id);
}

#[tokio::test]
async fn test_todo_routes_require_identity() {
    let app = build_app().await;

    for (method, path, body) in [
        (Method::GET, "/todos", None),
        (Method::POST, "/todos", Some(json!({ "task": "x" }))),
        (Method::POST, "/todos/1/toggle", None),
        (Method::DELETE, "/todos/1", None),
    ] {
        let (status, reply) = send(&app, method, path, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(reply["error"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_bad_tokens_read_as_unauthenticated() {
    let app = build_app().await;
    let (token, _) = login(&app, "alice", "pw1").await;
    let mut tampered = token.clone();
    tampered.pop();
    tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

    for bad in ["garbage", "a.b.c", tampered.as_str()] {
        let (status, reply) = send(&app, Method::GET, "/todos", Some(bad), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply["error"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_other_users_todos_are_invisible() {
    let app = build_app().await;
    let (alice, _) = login(&app, "alice", "pw1").await;
    let (bob, _) = login(&app, "bob", "pw2").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/todos",
        Some(&alice),
        Some(json!({ "task": "alice only" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (_, listed) = send(&app, Method::GET, "/todos", Some(&bob), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, toggled) = send(&app, Method::POST, &format!("/todos/{id}/toggle"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(toggled.is_null());

    let (_, deleted) = send(&app, Method::DELETE, &format!("/todos/{id}"), Some(&bob), None).await;
    assert!(deleted.is_null());

    let (_, mine) = send(&app, Method::GET, "/todos", Some(&alice), None).await;
    assert_eq!(mine[0]["completed"], false);
}

#[tokio::test]
async fn test_delete_returns_prior_state_then_null() {
    let app = build_app().await;
    let (token, owner_id) = login(&app, "alice", "pw1").await;
    let token = Some(token.as_str());

    let (_, created) = send(&app, Method::POST, "/todos", token, Some(json!({ "task": "once" }))).await;
    let id = created["id"].as_i64().unwrap();

    let (_, first) = send(&app, Method::DELETE, &format!("/todos/{id}"), token, None).await;
    assert_eq!(first["task"], "once");
    assert_eq!(first["owner_id"], owner_id);

    let (status, second) = send(&app, Method::DELETE, &format!("/todos/{id}"), token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(second.is_null());
}

#[tokio::test]
async fn test_blank_task_is_invalid_input() {
    let app = build_app().await;
    let (token, _) = login(&app, "alice", "pw1").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/todos",
        Some(&token),
        Some(json!({ "task": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_anonymous_caller_rejected_before_input_is_parsed() {
    let app = build_app().await;

    for (method, path, body) in [
        (Method::POST, "/todos", Some(json!({}))),
        (Method::POST, "/todos/abc/toggle", None),
        (Method::DELETE, "/todos/abc", None),
        (Method::GET, "/todos?completed=maybe", None),
    ] {
        let (status, reply) = send(&app, method, path, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(reply["error"], "UNAUTHENTICATED", "{path}");
    }
}

#[tokio::test]
async fn test_unparseable_input_is_json_invalid_input() {
    let app = build_app().await;
    let (token, _) = login(&app, "alice", "pw1").await;

    let response = app
        .clone()
        .oneshot(json_request(Method::DELETE, "/todos/abc", Some(&token), None))
        .await
        .expect("request failed");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["content-type"],
        "application/json",
    );
    assert_eq!(body_json(response).await["error"], "INVALID_INPUT");

    for (method, path, token, body) in [
        (Method::POST, "/todos", Some(token.as_str()), Some(json!({}))),
        (Method::POST, "/todos/abc/toggle", Some(token.as_str()), None),
        (Method::GET, "/todos?completed=maybe", Some(token.as_str()), None),
        (Method::POST, "/authenticate", None, Some(json!({ "username": "bob" }))),
    ] {
        let (status, reply) = send(&app, method, path, token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(reply["error"], "INVALID_INPUT", "{path}");
    }
}
