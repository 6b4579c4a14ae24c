//! Web server module for the docs webhook.
//!
//! This module provides the HTTP surface:
//! - `POST /api/docs`: verifies a push webhook and triggers a rebuild
//! - `GET /health`: liveness probe

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    docs_webhook, health, rejection_response, AppState, HealthResponse, HookResponse,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/docs", post(docs_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
