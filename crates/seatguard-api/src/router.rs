//! Route definitions for the SeatGuard HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(session_routes())
        .merge(organization_routes())
        .merge(health_routes());

    let router = Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .layer(TraceLayer::new_for_http());

    match middleware::cors::build_cors_layer(&state.config.server) {
        Some(cors) => router.layer(cors).with_state(state),
        None => router.with_state(state),
    }
}

/// Login, logout, heartbeat
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/heartbeat", post(handlers::auth::heartbeat))
}

/// Seat status, active sessions and audit trail of one organization
fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations/{id}/seats",
            get(handlers::organization::seat_status),
        )
        .route(
            "/organizations/{id}/sessions",
            get(handlers::organization::list_sessions),
        )
        .route(
            "/organizations/{id}/audit",
            get(handlers::organization::audit_trail),
        )
}

/// Liveness and store reachability
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
