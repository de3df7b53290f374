pub mod error;
pub mod routes;
pub mod upload;


use crate::config::Config;
use crate::inference::adapter::InferenceAdapter;
use crate::library::logger::interface::Logger;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<InferenceAdapter>,
    pub config: Arc<Config>,
    pub logger: Arc<dyn Logger + Send + Sync>,
}

impl AppState {
    pub fn new(
        adapter: Arc<InferenceAdapter>,
        config: Arc<Config>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            adapter,
            config,
            logger: logger.with_namespace("server"),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);
    let front_end = ServeDir::new(&state.config.static_dir);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/predict", post(routes::predict))
        .route("/camera_predict", post(routes::camera_predict))
        .route("/health", get(routes::health))
        .nest_service("/uploads", uploads)
        .fallback_service(front_end)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn serve(state: AppState) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&state.config.upload_dir).await?;

    let listener = tokio::net::TcpListener::bind(state.config.bind_address).await?;
    let _ = state.logger.info(&format!(
        "Listening on http://{} (model loaded: {})",
        listener.local_addr()?,
        state.adapter.is_available()
    ));

    axum::serve(listener, router(state)).await
}
