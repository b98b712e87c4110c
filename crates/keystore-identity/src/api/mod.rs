//! HTTP API for the identity service.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{json_content_type, rate_limit_middleware, request_logging, RateLimitState};
pub use types::*;

use crate::registry::KeystoreRegistry;
use axum::{middleware as axum_middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Keystore registry
    pub registry: KeystoreRegistry,
}

impl AppState {
    /// Create new application state.
    pub fn new(registry: KeystoreRegistry) -> Self {
        Self { registry }
    }
}

/// Create the API router without rate limiting.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::disabled())
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let api = Router::new()
        .route("/info", get(handlers::info))
        .route("/accounts", get(handlers::list_accounts))
        .route("/account/:address", get(handlers::get_account))
        .layer(axum_middleware::map_response(json_content_type));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(request_logging))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
