use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(crate::routes::health::health))
        .route("/api/analyze", post(crate::routes::analyze::analyze))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
