//! Route configuration.

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let data_routes = Router::new()
        .route("/load", post(handlers::load_data))
        .route("/head", post(handlers::head))
        .route("/tail", post(handlers::tail))
        .route("/describe", post(handlers::describe))
        .route("/metadata", post(handlers::metadata))
        .route("/refresh", post(handlers::refresh))
        .route("/cache", delete(handlers::clear_cache));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/data", data_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
