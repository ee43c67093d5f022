//! Client for the PageSpeed Insights v5 API.
//!
//! The report types only model the slices of the payload the engine
//! consumes: category scores, the audit map, and the optional field-data
//! block. Everything else rides along untouched in the raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::PAGESPEED_TIMEOUT_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Mobile
    }
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Mobile => "mobile",
            Strategy::Desktop => "desktop",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PageSpeedError {
    #[error("quota exhausted")]
    Quota,

    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("{0}")]
    Http(String),
}

// ============================================================================
// Report types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedReport {
    pub lighthouse_result: LighthouseResult,
    /// Real-user (CrUX) field data. Absent for low-traffic origins.
    pub loading_experience: Option<LoadingExperience>,
    #[serde(rename = "analysisUTCTimestamp")]
    pub analysis_utc_timestamp: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LighthouseResult {
    pub categories: Categories,
    pub audits: HashMap<String, Audit>,
    pub fetch_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Categories {
    pub performance: Option<CategoryScore>,
    pub seo: Option<CategoryScore>,
    pub accessibility: Option<CategoryScore>,
    #[serde(rename = "best-practices")]
    pub best_practices: Option<CategoryScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryScore {
    /// 0.0–1.0, null when Lighthouse could not score the category.
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub score: Option<f64>,
    pub numeric_value: Option<f64>,
    pub details: Option<AuditDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetails {
    #[serde(rename = "type")]
    pub detail_type: Option<String>,
    pub overall_savings_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingExperience {
    pub metrics: Option<HashMap<String, FieldMetric>>,
    // The API emits this one field in snake_case.
    #[serde(rename = "overall_category")]
    pub overall_category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetric {
    pub percentile: Option<f64>,
    pub category: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

pub struct PageSpeedClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PageSpeedClient {
    pub fn new(http: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    /// Run a PageSpeed analysis for `target`. No retries: a failure is
    /// terminal for the request that triggered it.
    pub async fn analyze(
        &self,
        target: &str,
        strategy: Strategy,
    ) -> Result<PageSpeedReport, PageSpeedError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("url", target),
            ("strategy", strategy.as_str()),
            ("category", "performance"),
            ("category", "seo"),
            ("category", "accessibility"),
            ("category", "best-practices"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let resp = self
            .http
            .get(&self.base_url)
            .query(&query)
            .timeout(Duration::from_secs(PAGESPEED_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PageSpeedError::Timeout
                } else {
                    PageSpeedError::Http(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body));
        }

        resp.json::<PageSpeedReport>()
            .await
            .map_err(|e| PageSpeedError::Malformed(e.to_string()))
    }
}

/// Map a non-2xx upstream response onto the error taxonomy. The API reports
/// unreachable documents as a 400/500 with a Lighthouse error code in the
/// body rather than a dedicated status.
fn classify_failure(status: u16, body: &str) -> PageSpeedError {
    if status == 429 {
        return PageSpeedError::Quota;
    }
    if body.contains("FAILED_DOCUMENT_REQUEST")
        || body.contains("ERRORED_DOCUMENT_REQUEST")
        || body.contains("DNS_FAILURE")
    {
        return PageSpeedError::Unreachable(format!("upstream status {}", status));
    }
    PageSpeedError::Http(format!("upstream status {}", status))
}
