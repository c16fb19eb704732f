use artdid_registry::Registry;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;

/// Build the axum router with all registry endpoints.
pub fn build_router(registry: Registry) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/resolve", get(handler::resolve_handler))
        .route("/check", get(handler::check_handler))
        .route("/register", post(handler::register_handler))
        .route("/update", put(handler::update_handler))
        .route("/transfer", post(handler::transfer_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}
