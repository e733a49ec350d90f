use sqlx::SqlitePool;

use crate::entities::Todo;
use crate::error::ApiError;
use crate::gate::OwnerId;

/// Todo rows, always scoped to one owner. A row that is missing and a row
/// owned by someone else look the same: `None`.
#[derive(Debug, Clone)]
pub struct TodoRepository {
    sqlite_pool: SqlitePool,
}

impl TodoRepository {
    pub fn new(sqlite_pool: SqlitePool) -> Self {
        Self { sqlite_pool }
    }

    pub async fn list(&self, owner: OwnerId, completed: Option<bool>) -> Result<Vec<Todo>, ApiError> {
        let todos = sqlx::query_as(
            "SELECT id, task, completed, owner_id, created_at FROM todos \
             WHERE owner_id = ? AND (? IS NULL OR completed = ?) ORDER BY id",
        )
        .bind(owner.get())
        .bind(completed)
        .bind(completed)
        .fetch_all(&self.sqlite_pool)
        .await?;
        Ok(todos)
    }

    pub async fn create(&self, owner: OwnerId, task: &str) -> Result<Todo, ApiError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(ApiError::InvalidInput("task must not be empty".to_string()));
        }

        let todo = sqlx::query_as(
            "INSERT INTO todos (task, completed, owner_id) VALUES (?, 0, ?) \
             RETURNING id, task, completed, owner_id, created_at",
        )
        .bind(task)
        .bind(owner.get())
        .fetch_one(&self.sqlite_pool)
        .await?;
        Ok(todo)
    }

    /// Flips `completed` in one statement so concurrent toggles never lose
    /// an update.
    pub async fn toggle_completed(&self, owner: OwnerId, id: i64) -> Result<Option<Todo>, ApiError> {
        let todo = sqlx::query_as(
            "UPDATE todos SET completed = NOT completed WHERE id = ? AND owner_id = ? \
             RETURNING id, task, completed, owner_id, created_at",
        )
        .bind(id)
        .bind(owner.get())
        .fetch_optional(&self.sqlite_pool)
        .await?;
        Ok(todo)
    }

    /// Returns the row as it was before deletion.
    pub async fn delete(&self, owner: OwnerId, id: i64) -> Result<Option<Todo>, ApiError> {
        let todo = sqlx::query_as(
            "DELETE FROM todos WHERE id = ? AND owner_id = ? \
             RETURNING id, task, completed, owner_id, created_at",
        )
        .bind(id)
        .bind(owner.get())
        .fetch_optional(&self.sqlite_pool)
        .await?;
        Ok(todo)
    }
}
