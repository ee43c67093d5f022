//! Ranks actionable Lighthouse findings by estimated time savings.

use serde::Serialize;

use crate::config::{
    MAX_OPPORTUNITIES, OPPORTUNITY_HIGH_IMPACT_MS, OPPORTUNITY_MEDIUM_IMPACT_MS,
};
use crate::pagespeed::LighthouseResult;

#[derive(Debug, Clone)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub description: String,
    pub savings_ms: Option<f64>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub savings_ms: f64,
    pub impact: ImpactTier,
}

/// Pull opportunity-type audits out of a Lighthouse result. Audit maps are
/// unordered on the wire, so findings are canonicalized by id before
/// ranking, which makes the result deterministic for identical reports.
pub fn findings_from_report(lh: &LighthouseResult) -> Vec<Finding> {
    let mut findings: Vec<Finding> = lh
        .audits
        .iter()
        .filter(|(_, audit)| {
            audit
                .details
                .as_ref()
                .and_then(|d| d.detail_type.as_deref())
                == Some("opportunity")
        })
        .map(|(id, audit)| Finding {
            id: id.clone(),
            title: audit.title.clone().unwrap_or_default(),
            description: audit.description.clone().unwrap_or_default(),
            savings_ms: audit.details.as_ref().and_then(|d| d.overall_savings_ms),
            score: audit.score,
        })
        .collect();
    findings.sort_by(|a, b| a.id.cmp(&b.id));
    findings
}

/// Filter, rank, and tier findings: drop anything with no savings estimate
/// or a perfect score, sort descending by savings (stable; ties keep input
/// order), cap at the top 10.
pub fn rank(findings: Vec<Finding>) -> Vec<Opportunity> {
    let mut actionable: Vec<(f64, Finding)> = findings
        .into_iter()
        .filter_map(|f| {
            if f.score == Some(1.0) {
                return None;
            }
            match f.savings_ms {
                Some(ms) if ms > 0.0 => Some((ms, f)),
                _ => None,
            }
        })
        .collect();

    actionable.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    actionable
        .into_iter()
        .take(MAX_OPPORTUNITIES)
        .map(|(ms, f)| Opportunity {
            id: f.id,
            title: f.title,
            description: f.description,
            savings_ms: ms,
            impact: impact_tier(ms),
        })
        .collect()
}

fn impact_tier(savings_ms: f64) -> ImpactTier {
    if savings_ms > OPPORTUNITY_HIGH_IMPACT_MS {
        ImpactTier::High
    } else if savings_ms > OPPORTUNITY_MEDIUM_IMPACT_MS {
        ImpactTier::Medium
    } else {
        ImpactTier::Low
    }
}
