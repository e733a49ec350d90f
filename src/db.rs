use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Open the pool and bring the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;
    info!(url = %config.url, "database ready");

    Ok(pool)
}

/// Single-connection in-memory database, so every query sees the same data.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    connect(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        acquire_timeout_ms: 3000,
    })
    .await
    .expect("in-memory database")
}

/// File-backed database allowing real concurrent connections.
#[cfg(test)]
pub(crate) async fn file_pool(dir: &tempfile::TempDir) -> SqlitePool {
    let path = dir.path().join("todos.db");
    connect(&DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        max_connections: 8,
        acquire_timeout_ms: 10_000,
    })
    .await
    .expect("file database")
}
