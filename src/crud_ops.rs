use axum::{extract::State, http::StatusCode};

use crate::entities::{NewTodo, Todo, TodoFilter};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::gate::OwnerId;
use crate::state::AppState;

// `OwnerId` comes first in every handler so an anonymous caller is turned
// away before the path, query or body is looked at.

pub async fn list_todos(
    owner: OwnerId,
    State(state): State<AppState>,
    Query(filter): Query<TodoFilter>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list(owner, filter.completed).await?;
    Ok(Json(todos))
}

pub async fn add_todo(
    owner: OwnerId,
    State(state): State<AppState>,
    Json(new_todo): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.todos.create(owner, &new_todo.task).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `null` when the id is unknown or belongs to someone else.
pub async fn toggle_todo(
    owner: OwnerId,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<Todo>>, ApiError> {
    let todo = state.todos.toggle_completed(owner, id).await?;
    Ok(Json(todo))
}

/// Echoes the deleted row, or `null` when there was nothing to delete.
pub async fn delete_todo(
    owner: OwnerId,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Option<Todo>>, ApiError> {
    let todo = state.todos.delete(owner, id).await?;
    Ok(Json(todo))
}
