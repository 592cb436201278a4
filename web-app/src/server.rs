use crate::api::{self, AppState};
use axum::routing::{get, post};
use axum::Router;
use prediction_engine::Predictor;
use rcc_core::{ConfigError, CoreError, ServerConfig};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::home))
        .route("/class", post(api::classify))
        .route("/subreddits", get(api::subreddits))
        .with_state(state)
}

/// Reads the home page once; it is served verbatim afterwards.
pub fn load_home_page(path: &Path) -> Result<Arc<str>, CoreError> {
    let contents = fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    Ok(Arc::from(contents))
}

pub async fn serve(config: &ServerConfig, predictor: Arc<Predictor>) -> Result<(), CoreError> {
    let state = AppState {
        predictor,
        home_page: load_home_page(&config.home_page)?,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
