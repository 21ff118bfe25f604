//! HTTP route registration

pub mod config;
pub mod ingest;
pub mod query;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::server::state::AppState;

/// Maximum accepted multipart upload size
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// All API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(config::get_config).post(config::update_config))
        .route(
            "/ingest",
            post(ingest::ingest_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/ingest_urls", post(ingest::ingest_urls))
        .route("/ingest_sharepoint", post(ingest::ingest_sharepoint))
        .route("/chat", post(query::chat))
}
