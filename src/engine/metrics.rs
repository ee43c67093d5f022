//! Canonicalizes a raw PageSpeed report into the metric record the rest of
//! the engine consumes.
//!
//! Two different "nothing there" cases must stay distinct: a category or
//! field-data block the API did not return stays `None` all the way to the
//! response, while an individual audit the tool has no measurement for
//! yields `0.0`, a legitimate "no data" value rather than a fabricated best or
//! worst reading.

use serde::Serialize;

use crate::pagespeed::{LighthouseResult, PageSpeedReport};

/// Business economics for one analysis. Validated at the request boundary;
/// values are never clamped into range on the caller's behalf.
#[derive(Debug, Clone, Copy)]
pub struct BusinessInputs {
    pub monthly_traffic: u64,
    /// Percentage, 0–100.
    pub conversion_rate: f64,
    pub average_ticket: f64,
}

impl BusinessInputs {
    pub fn baseline_monthly_revenue(&self) -> f64 {
        self.monthly_traffic as f64 * (self.conversion_rate / 100.0) * self.average_ticket
    }
}

/// Canonical per-site metrics, immutable for the duration of one analysis.
#[derive(Debug, Clone, Copy)]
pub struct WebsiteMetrics {
    pub business: BusinessInputs,
    pub lcp_seconds: f64,
    pub inp_milliseconds: f64,
    pub cls_score: f64,
    pub accessibility_score: u8,
    pub mobile_optimized: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub performance: u8,
    pub seo: u8,
    pub accessibility: u8,
    pub best_practices: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    pub lcp_seconds: f64,
    pub inp_milliseconds: f64,
    pub cls_score: f64,
}

/// Field-data percentiles from real visitors. Only present for origins with
/// enough traffic; absence is reported as `null`, never as zeros.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealUserData {
    pub lcp_percentile_ms: Option<f64>,
    pub inp_percentile_ms: Option<f64>,
    pub cls_percentile: Option<f64>,
    pub overall_category: Option<String>,
}

pub struct NormalizedReport {
    pub category_scores: CategoryScores,
    pub core_web_vitals: CoreWebVitals,
    pub accessibility_score: u8,
    pub mobile_optimized: bool,
    pub real_user_data: Option<RealUserData>,
}

pub fn normalize(report: &PageSpeedReport) -> NormalizedReport {
    let lh = &report.lighthouse_result;

    let category_scores = CategoryScores {
        performance: scale_category(lh.categories.performance.as_ref().and_then(|c| c.score)),
        seo: scale_category(lh.categories.seo.as_ref().and_then(|c| c.score)),
        accessibility: scale_category(
            lh.categories.accessibility.as_ref().and_then(|c| c.score),
        ),
        best_practices: scale_category(
            lh.categories.best_practices.as_ref().and_then(|c| c.score),
        ),
    };

    let core_web_vitals = CoreWebVitals {
        lcp_seconds: audit_value(lh, "largest-contentful-paint") / 1000.0,
        inp_milliseconds: inp_value(lh),
        cls_score: audit_value(lh, "cumulative-layout-shift"),
    };

    NormalizedReport {
        category_scores,
        core_web_vitals,
        accessibility_score: category_scores.accessibility,
        mobile_optimized: viewport_passes(lh),
        real_user_data: real_user_data(report),
    }
}

/// 0.0–1.0 category score → 0–100 integer. A null score is the tool's
/// "could not measure" marker and maps to 0.
fn scale_category(score: Option<f64>) -> u8 {
    let scaled = (score.unwrap_or(0.0) * 100.0).round();
    scaled.clamp(0.0, 100.0) as u8
}

/// Numeric value for an audit, clamped non-negative. 0.0 when the audit is
/// absent or carries no numeric value.
fn audit_value(lh: &LighthouseResult, id: &str) -> f64 {
    lh.audits
        .get(id)
        .and_then(|a| a.numeric_value)
        .unwrap_or(0.0)
        .max(0.0)
}

fn inp_value(lh: &LighthouseResult) -> f64 {
    // Older Lighthouse versions report INP under the experimental id.
    let primary = audit_value(lh, "interaction-to-next-paint");
    if primary > 0.0 {
        return primary;
    }
    audit_value(lh, "experimental-interaction-to-next-paint")
}

fn viewport_passes(lh: &LighthouseResult) -> bool {
    lh.audits
        .get("viewport")
        .and_then(|a| a.score)
        .unwrap_or(0.0)
        >= 0.9
}

fn real_user_data(report: &PageSpeedReport) -> Option<RealUserData> {
    let le = report.loading_experience.as_ref()?;
    let metrics = le.metrics.as_ref();

    let percentile = |key: &str| -> Option<f64> {
        metrics
            .and_then(|m| m.get(key))
            .and_then(|m| m.percentile)
    };

    Some(RealUserData {
        lcp_percentile_ms: percentile("LARGEST_CONTENTFUL_PAINT_MS"),
        inp_percentile_ms: percentile("INTERACTION_TO_NEXT_PAINT"),
        // CrUX reports CLS percentiles scaled by 100.
        cls_percentile: percentile("CUMULATIVE_LAYOUT_SHIFT_SCORE").map(|v| v / 100.0),
        overall_category: le.overall_category.clone(),
    })
}
