//! Route definitions for the flight search API.

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handler::search_flights;
use super::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/flights/search", post(search_flights))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
