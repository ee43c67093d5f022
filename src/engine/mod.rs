//! The analysis engine: a pure, synchronous pipeline from a raw diagnostic
//! report plus business inputs to a scored, ranked, monetized outcome.
//!
//! Nothing in this tree performs I/O or touches shared state; the request
//! boundary owns all of that.

pub mod composite;
pub mod metrics;
pub mod opportunities;
pub mod revenue;
pub mod urgency;

use serde::Serialize;

use crate::pagespeed::PageSpeedReport;
use metrics::{BusinessInputs, CategoryScores, CoreWebVitals, RealUserData, WebsiteMetrics};
use opportunities::Opportunity;
use revenue::RevenueLossBreakdown;
use urgency::LeadTier;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueImpact {
    #[serde(flatten)]
    pub breakdown: RevenueLossBreakdown,
    pub urgency_score: u8,
    pub lead_tier: LeadTier,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub composite_score: u8,
    pub category_scores: CategoryScores,
    pub core_web_vitals: CoreWebVitals,
    pub real_user_data: Option<RealUserData>,
    pub opportunities: Vec<Opportunity>,
    pub revenue_impact: RevenueImpact,
}

/// Run the full pipeline: normalize → composite + opportunities → revenue
/// model → urgency. Deterministic for identical inputs.
pub fn run(report: &PageSpeedReport, business: BusinessInputs) -> AnalysisOutcome {
    let normalized = metrics::normalize(report);

    let composite_score = composite::composite_score(&normalized.category_scores);

    let findings = opportunities::findings_from_report(&report.lighthouse_result);
    let ranked = opportunities::rank(findings);

    let site_metrics = WebsiteMetrics {
        business,
        lcp_seconds: normalized.core_web_vitals.lcp_seconds,
        inp_milliseconds: normalized.core_web_vitals.inp_milliseconds,
        cls_score: normalized.core_web_vitals.cls_score,
        accessibility_score: normalized.accessibility_score,
        mobile_optimized: normalized.mobile_optimized,
    };
    let breakdown = revenue::compute(&site_metrics);

    let score = urgency::urgency_score(&breakdown);
    let tier = urgency::classify(score);

    AnalysisOutcome {
        composite_score,
        category_scores: normalized.category_scores,
        core_web_vitals: normalized.core_web_vitals,
        real_user_data: normalized.real_user_data,
        opportunities: ranked,
        revenue_impact: RevenueImpact {
            breakdown,
            urgency_score: score,
            lead_tier: tier,
        },
    }
}

/// Startup invariant check over every static table the engine relies on.
pub fn validate_tables() -> anyhow::Result<()> {
    composite::validate_weights()?;
    revenue::validate_tables()?;
    Ok(())
}
