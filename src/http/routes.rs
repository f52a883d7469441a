use std::path::Path;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Create the static host router: the compressed asset tree at the root
/// path, with the entry document as fallback for client-side routes.
pub fn create_router(assets_dir: impl AsRef<Path>, index_file: &str) -> Router {
    let assets_dir = assets_dir.as_ref();
    let spa = ServeDir::new(assets_dir)
        .precompressed_gzip()
        .fallback(ServeFile::new(assets_dir.join(index_file)));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Everything else is the SPA
        .fallback_service(spa)
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
}

/// GET /health
/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
