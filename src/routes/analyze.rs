use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{
    DEFAULT_AVERAGE_TICKET, DEFAULT_CONVERSION_RATE, DEFAULT_MONTHLY_TRAFFIC,
    RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS,
};
use crate::engine;
use crate::engine::metrics::{BusinessInputs, CategoryScores, CoreWebVitals, RealUserData};
use crate::engine::opportunities::Opportunity;
use crate::engine::RevenueImpact;
use crate::error::{FieldError, ImpactError};
use crate::history::AnalysisRecord;
use crate::pagespeed::Strategy;
use crate::rate_limit::Decision;
use crate::state::SharedState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub url: String,
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub strategy: Strategy,
    pub save_history: Option<bool>,
    /// Business economics. Optional; defaults are applied when absent so a
    /// breakdown is always computable.
    pub business: Option<BusinessRequest>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRequest {
    pub monthly_traffic: u64,
    pub conversion_rate: f64,
    pub average_ticket: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub composite_score: u8,
    pub category_scores: CategoryScores,
    pub core_web_vitals: CoreWebVitals,
    pub real_user_data: Option<RealUserData>,
    pub opportunities: Vec<Opportunity>,
    pub revenue_impact: RevenueImpact,
    pub analysis_id: Option<Uuid>,
    pub strategy: Strategy,
    pub analyzed_url: String,
    pub fetch_time: String,
}

// ============================================================================
// Validation
// ============================================================================

fn validate_url(raw: &str) -> Result<url::Url, FieldError> {
    let parsed = url::Url::parse(raw)
        .map_err(|_| FieldError::new("url", "not a valid URL"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(FieldError::new("url", "scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(FieldError::new("url", "missing host"));
    }
    Ok(parsed)
}

/// Strict range checks for caller-supplied economics. These describe the
/// client's actual business, so out-of-range values are rejected, never
/// clamped into range.
fn validate_business(business: &BusinessRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if business.monthly_traffic == 0 {
        errors.push(FieldError::new(
            "business.monthlyTraffic",
            "must be a positive visitor count",
        ));
    }
    if !business.conversion_rate.is_finite()
        || business.conversion_rate < 0.0
        || business.conversion_rate > 100.0
    {
        errors.push(FieldError::new(
            "business.conversionRate",
            "must be a percentage between 0 and 100",
        ));
    }
    if !business.average_ticket.is_finite() || business.average_ticket <= 0.0 {
        errors.push(FieldError::new(
            "business.averageTicket",
            "must be a positive amount",
        ));
    }
    errors
}

/// Client identity for throttling: first hop of x-forwarded-for when
/// present, else a shared local key.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

// ============================================================================
// Handler
// ============================================================================

pub async fn analyze(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ImpactError> {
    // Input validation precedes any computation or upstream traffic.
    let mut errors = Vec::new();
    let parsed_url = validate_url(&body.url).map_err(|e| errors.push(e)).ok();
    if let Some(business) = &body.business {
        errors.extend(validate_business(business));
    }
    let parsed_url = match (parsed_url, errors.is_empty()) {
        (Some(u), true) => u,
        _ => return Err(ImpactError::Validation(errors)),
    };

    if state.rate_limiter.check_and_record(&client_key(&headers)) == Decision::Limited {
        return Err(ImpactError::RateLimited {
            max: RATE_LIMIT_MAX_REQUESTS,
            window_secs: RATE_LIMIT_WINDOW_SECS,
        });
    }

    let report = state
        .pagespeed
        .analyze(parsed_url.as_str(), body.strategy)
        .await
        .map_err(|e| {
            warn!("PageSpeed fetch failed for {}: {}", parsed_url, e);
            ImpactError::from(e)
        })?;

    let business = body
        .business
        .map(|b| BusinessInputs {
            monthly_traffic: b.monthly_traffic,
            conversion_rate: b.conversion_rate,
            average_ticket: b.average_ticket,
        })
        .unwrap_or(BusinessInputs {
            monthly_traffic: DEFAULT_MONTHLY_TRAFFIC,
            conversion_rate: DEFAULT_CONVERSION_RATE,
            average_ticket: DEFAULT_AVERAGE_TICKET,
        });

    let fetch_time = report
        .analysis_utc_timestamp
        .clone()
        .or_else(|| report.lighthouse_result.fetch_time.clone())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let outcome = engine::run(&report, business);

    info!(
        "Analyzed {} ({}): composite={}, urgency={}",
        parsed_url,
        body.strategy.as_str(),
        outcome.composite_score,
        outcome.revenue_impact.urgency_score
    );

    // Persistence is fire-and-forget: the id is minted up front and the
    // insert runs off the response path. A failed write is logged, never
    // surfaced.
    let save_history = body.save_history.unwrap_or(true);
    let analysis_id = match (&state.history, save_history) {
        (Some(db), true) => {
            let id = Uuid::new_v4();
            let record = AnalysisRecord {
                id: id.to_string(),
                url: parsed_url.to_string(),
                strategy: body.strategy.as_str().to_string(),
                user_id: body.user_id.map(|u| u.to_string()),
                composite_score: outcome.composite_score as i64,
                urgency_score: outcome.revenue_impact.urgency_score as i64,
                results_json: serde_json::to_string(&serde_json::json!({
                    "categoryScores": &outcome.category_scores,
                    "coreWebVitals": &outcome.core_web_vitals,
                    "realUserData": &outcome.real_user_data,
                    "revenueImpact": &outcome.revenue_impact,
                    "fetchTime": &fetch_time,
                }))
                .unwrap_or_default(),
                created_at: Utc::now().to_rfc3339(),
            };
            let db = db.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(e) = db.insert(&record) {
                    warn!("Failed to persist analysis {}: {}", record.id, e);
                }
            });
            Some(id)
        }
        _ => None,
    };

    Ok(Json(AnalyzeResponse {
        composite_score: outcome.composite_score,
        category_scores: outcome.category_scores,
        core_web_vitals: outcome.core_web_vitals,
        real_user_data: outcome.real_user_data,
        opportunities: outcome.opportunities,
        revenue_impact: outcome.revenue_impact,
        analysis_id,
        strategy: body.strategy,
        analyzed_url: parsed_url.to_string(),
        fetch_time,
    }))
}
