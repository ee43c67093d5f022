use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::config::{RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub history_enabled: bool,
    pub rate_limit: RateLimitInfo,
}

#[derive(Serialize)]
pub struct RateLimitInfo {
    pub max_requests: usize,
    pub window_secs: u64,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        history_enabled: state.history.is_some(),
        rate_limit: RateLimitInfo {
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            window_secs: RATE_LIMIT_WINDOW_SECS,
        },
    })
}
