use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Database(#[from] crate::db::Error),

    #[error(transparent)]
    Api(#[from] crate::error::ApiError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Connect the store, build the router and serve until the process stops.
pub async fn run(config: AppConfig) -> Result<(), Error> {
    let config = Arc::new(config);
    let sqlite_pool = crate::db::connect(&config.database).await?;
    let state = AppState::new(config.clone(), sqlite_pool)?;
    let app = crate::router(state);

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
