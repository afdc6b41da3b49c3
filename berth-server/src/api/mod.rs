//! API Module
//!
//! HTTP API layer for the backend.
//! Each submodule handles endpoints for a specific domain.

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod saves;
pub mod server;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Account endpoints
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        // Server lifecycle endpoints
        .route("/api/launch", post(server::launch))
        .route("/api/launch-status/{task_id}", get(server::launch_status))
        .route("/api/install", post(server::install))
        // Save-game endpoints
        .route(
            "/api/download-saves",
            get(saves::download_saves).post(saves::download_saves),
        )
        .route("/api/upload-saves", post(saves::upload_saves))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
