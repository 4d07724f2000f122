//! Route definitions

use axum::{
    routing::get,
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Create the application router
///
/// All routes require a bearer token; authorization is enforced per
/// capability inside the services.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(thread_routes())
        .merge(flag_routes())
        .merge(history_routes())
}

/// Health check routes
///
/// Kept separate from the main router so they bypass rate limiting
/// and authentication.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check))
}

/// Thread queue routes
fn thread_routes() -> Router<AppState> {
    Router::new().route(
        "/threads",
        get(handlers::threads::list_threads).post(handlers::threads::execute_action),
    )
}

/// Flag routes
fn flag_routes() -> Router<AppState> {
    Router::new().route(
        "/flags",
        get(handlers::flags::list_flags).post(handlers::flags::execute_action),
    )
}

/// Moderation feed and audit trail routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/moderation", get(handlers::history::moderation_feed))
        .route("/audit", get(handlers::history::audit_trail))
}
