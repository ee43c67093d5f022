use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::pagespeed::PageSpeedError;

#[derive(Debug, thiserror::Error)]
pub enum ImpactError {
    #[error("Invalid request")]
    Validation(Vec<FieldError>),

    #[error("Rate limit exceeded: max {max} requests per {window_secs}s, retry later")]
    RateLimited { max: usize, window_secs: u64 },

    #[error("PageSpeed API quota exhausted, retry later")]
    UpstreamQuota,

    #[error("Target URL could not be analyzed: {0}")]
    TargetUnreachable(String),

    #[error("PageSpeed API timed out")]
    UpstreamTimeout,

    #[error("PageSpeed API returned an unusable payload: {0}")]
    UpstreamMalformed(String),

    #[error("PageSpeed API request failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<PageSpeedError> for ImpactError {
    fn from(err: PageSpeedError) -> Self {
        match err {
            PageSpeedError::Quota => ImpactError::UpstreamQuota,
            PageSpeedError::Unreachable(msg) => ImpactError::TargetUnreachable(msg),
            PageSpeedError::Timeout => ImpactError::UpstreamTimeout,
            PageSpeedError::Malformed(msg) => ImpactError::UpstreamMalformed(msg),
            PageSpeedError::Http(msg) => ImpactError::Upstream(msg),
        }
    }
}

impl IntoResponse for ImpactError {
    fn into_response(self) -> Response {
        let status = match &self {
            ImpactError::Validation(_) => StatusCode::BAD_REQUEST,
            ImpactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ImpactError::UpstreamQuota => StatusCode::TOO_MANY_REQUESTS,
            ImpactError::TargetUnreachable(_) => StatusCode::BAD_GATEWAY,
            ImpactError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ImpactError::UpstreamMalformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ImpactError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ImpactError::Validation(fields) => serde_json::json!({
                "error": "Validation failed",
                "fields": fields,
            }),
            other => serde_json::json!({
                "error": other.to_string(),
            }),
        };

        (status, axum::Json(body)).into_response()
    }
}
