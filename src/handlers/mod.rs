//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod execute;
pub mod health;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    constants::{API_BASE_PATH, MAX_SOURCE_CODE_SIZE, MAX_STDIN_SIZE},
    middleware::logging_middleware,
    state::AppState,
};

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(execute::routes())
}

/// Full application router with its layers
pub fn app(state: AppState) -> Router {
    // code and stdin plus room for the JSON envelope
    let body_limit = (MAX_SOURCE_CODE_SIZE + MAX_STDIN_SIZE) as usize + 64 * 1024;

    Router::new()
        .nest(API_BASE_PATH, routes())
        .layer(middleware::from_fn(logging_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
