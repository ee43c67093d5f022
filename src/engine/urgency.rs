//! Lead urgency: blends relative revenue loss with payback speed into a
//! 1–100 score and a hot/warm/cold triage tier.

use serde::Serialize;

use super::revenue::RevenueLossBreakdown;

const LOSS_WEIGHT: f64 = 0.6;
const ROI_WEIGHT: f64 = 0.4;
const HOT_THRESHOLD: u8 = 75;
const WARM_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadTier {
    Hot,
    Warm,
    Cold,
}

/// Pure function of the breakdown; no external state.
pub fn urgency_score(breakdown: &RevenueLossBreakdown) -> u8 {
    let loss_score = (breakdown.total_revenue_loss.percentage * 2.0).min(100.0);
    let roi_score =
        (100.0 - breakdown.potential_revenue_increase.roi_months as f64 * 10.0).max(0.0);
    let blended = (loss_score * LOSS_WEIGHT + roi_score * ROI_WEIGHT).round();
    blended.clamp(1.0, 100.0) as u8
}

pub fn classify(score: u8) -> LeadTier {
    if score >= HOT_THRESHOLD {
        LeadTier::Hot
    } else if score >= WARM_THRESHOLD {
        LeadTier::Warm
    } else {
        LeadTier::Cold
    }
}
