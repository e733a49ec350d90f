//! Multi-user todo API: bearer-token authentication and owner-scoped CRUD.

pub mod authentication;
pub mod config;
pub mod crud_ops;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod gate;
pub mod identity;
pub mod logging;
pub mod password;
pub mod startup;
pub mod state;
pub mod todos;
pub mod token;
pub mod users;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

async fn health_check() -> &'static str {
    "OK"
}

pub fn router(state: AppState) -> Router {
    let cors_permissive = state.config.cors_permissive;

    let app = Router::new()
        .route("/authenticate", post(authentication::authenticate))
        .route("/todos", get(crud_ops::list_todos).post(crud_ops::add_todo))
        .route("/todos/{id}", delete(crud_ops::delete_todo))
        .route("/todos/{id}/toggle", post(crud_ops::toggle_todo))
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity::resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
