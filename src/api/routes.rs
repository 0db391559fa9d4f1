//! Route table

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::middleware::RateLimitLayer;
use crate::AppState;

/// Build the application router
///
/// The generation endpoint is served at `/generate-image` and, for pages
/// built against the older layout, at `/api/generate-image`. Rate limiting,
/// when enabled, applies to POST only.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut generate = post(handlers::generate_image);
    if let Some(limiter) = RateLimitLayer::from_config(&state.settings.rate_limit) {
        generate = generate.layer(limiter);
    }
    let generate = generate.get(handlers::list_images);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/generate-image", generate.clone())
        .route("/api/generate-image", generate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
