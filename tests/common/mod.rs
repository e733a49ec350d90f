#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use todo_api::config::{AppConfig, DatabaseConfig, JwtConfig, LoggingConfig, PasswordConfig};
use todo_api::state::AppState;

pub const SECRET: &str = "integration-secret-integration-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_address: "127.0.0.1:0".to_string(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_ms: 3000,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
            issuer: "todo-api".to_string(),
            exp_seconds: None,
        },
        password: PasswordConfig {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        },
        logging: LoggingConfig::default(),
        cors_permissive: false,
    }
}

pub async fn build_app() -> Router {
    let config = Arc::new(test_config());
    let pool = todo_api::db::connect(&config.database)
        .await
        .expect("failed to open database");
    let state = AppState::new(config, pool).expect("failed to build state");
    todo_api::router(state)
}

pub fn json_request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
        None => builder.body(Body::empty()).expect("failed to build request"),
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not JSON")
}
