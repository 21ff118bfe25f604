//! HTTP server assembly

pub mod routes;
pub mod state;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The ingestion and retrieval HTTP server
pub struct RagServer {
    state: AppState,
}

impl RagServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Bind and serve until the process exits
    pub async fn run(self) -> Result<()> {
        let config: &AppConfig = self.state.config();
        let addr = format!("{}:{}", config.host, config.port);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("failed to bind {addr}: {e}")))?;
        tracing::info!(%addr, "server listening");

        let router = build_router(self.state);
        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(e.to_string()))
    }
}
