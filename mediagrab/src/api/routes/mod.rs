//! API route modules.
//!
//! Organizes routes by resource type.

pub mod health;
pub mod proxy;
pub mod resolve;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/resolve", resolve::router())
        .nest("/api/proxy", proxy::router())
        .nest("/health", health::router())
        .with_state(state)
}
