//! Revenue loss model: converts canonical site metrics into a monetary-loss
//! breakdown via per-metric severity bands, retention factors, and weighted
//! attribution.

use serde::Serialize;

use super::metrics::WebsiteMetrics;
use crate::config::{
    IMPLEMENTATION_COST, MOBILE_TRAFFIC_SHARE, RECOVERABLE_LOSS_SHARE, UNIQUE_VISITOR_CAP,
};

// ============================================================================
// Factor tables
// ============================================================================

/// How severity relates to the raw value for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Timings and CLS: larger values are worse. `bound` is an inclusive
    /// upper bound; the final band's bound is infinity.
    HigherIsWorse,
    /// Scores: smaller values are worse. `bound` is an inclusive lower
    /// bound; the final band's bound is 0.
    LowerIsWorse,
}

#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub label: &'static str,
    pub bound: f64,
    /// Fraction of conversions/visitors retained at this severity, in (0,1].
    pub factor: f64,
}

pub struct FactorTable {
    pub metric: &'static str,
    pub direction: Direction,
    /// Ordered best band first.
    pub bands: &'static [Band],
}

pub static LCP_TABLE: FactorTable = FactorTable {
    metric: "lcp",
    direction: Direction::HigherIsWorse,
    bands: &[
        Band { label: "good", bound: 2.5, factor: 1.0 },
        Band { label: "needs-improvement", bound: 4.0, factor: 0.88 },
        Band { label: "poor", bound: f64::INFINITY, factor: 0.72 },
    ],
};

pub static INP_TABLE: FactorTable = FactorTable {
    metric: "inp",
    direction: Direction::HigherIsWorse,
    bands: &[
        Band { label: "good", bound: 200.0, factor: 1.0 },
        Band { label: "needs-improvement", bound: 500.0, factor: 0.92 },
        Band { label: "poor", bound: f64::INFINITY, factor: 0.80 },
    ],
};

pub static CLS_TABLE: FactorTable = FactorTable {
    metric: "cls",
    direction: Direction::HigherIsWorse,
    bands: &[
        Band { label: "good", bound: 0.1, factor: 1.0 },
        Band { label: "needs-improvement", bound: 0.25, factor: 0.94 },
        Band { label: "poor", bound: f64::INFINITY, factor: 0.85 },
    ],
};

pub static ACCESSIBILITY_TABLE: FactorTable = FactorTable {
    metric: "accessibility",
    direction: Direction::LowerIsWorse,
    bands: &[
        Band { label: "excellent", bound: 90.0, factor: 1.0 },
        Band { label: "good", bound: 75.0, factor: 0.95 },
        Band { label: "fair", bound: 50.0, factor: 0.88 },
        Band { label: "poor", bound: 0.0, factor: 0.78 },
    ],
};

/// Keyed on a 0–100 mobile-experience score; the boolean input maps to 100
/// or 0, so only the best and worst bands are reachable today. The partial
/// band is kept so a score-valued input needs no table change.
pub static MOBILE_TABLE: FactorTable = FactorTable {
    metric: "mobile",
    direction: Direction::LowerIsWorse,
    bands: &[
        Band { label: "optimized", bound: 90.0, factor: 1.0 },
        Band { label: "partial", bound: 50.0, factor: 0.88 },
        Band { label: "poor", bound: 0.0, factor: 0.75 },
    ],
};

/// Revenue attribution weights across the five factors. Must sum to 1.0.
pub const FACTOR_WEIGHTS: [(&str, f64); 5] = [
    ("lcp", 0.35),
    ("inp", 0.20),
    ("cls", 0.15),
    ("accessibility", 0.20),
    ("mobile", 0.10),
];

impl FactorTable {
    /// Map a value onto its severity band. Bands are contiguous and
    /// exhaustive, so every finite value lands somewhere.
    pub fn band_for(&self, value: f64) -> &Band {
        let found = match self.direction {
            Direction::HigherIsWorse => self.bands.iter().find(|b| value <= b.bound),
            Direction::LowerIsWorse => self.bands.iter().find(|b| value >= b.bound),
        };
        // The last band's bound is infinity / 0, so only a NaN can miss;
        // treat that as worst.
        found.unwrap_or(&self.bands[self.bands.len() - 1])
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bands.is_empty() {
            anyhow::bail!("{}: empty band table", self.metric);
        }
        if self.bands[0].factor != 1.0 {
            anyhow::bail!("{}: best band factor must be 1.0", self.metric);
        }
        for pair in self.bands.windows(2) {
            if pair[1].factor > pair[0].factor {
                anyhow::bail!("{}: factors must be non-increasing", self.metric);
            }
            let ordered = match self.direction {
                Direction::HigherIsWorse => pair[1].bound > pair[0].bound,
                Direction::LowerIsWorse => pair[1].bound < pair[0].bound,
            };
            if !ordered {
                anyhow::bail!("{}: band bounds must be strictly ordered", self.metric);
            }
        }
        for band in self.bands {
            if band.factor <= 0.0 || band.factor > 1.0 {
                anyhow::bail!("{}: factors must lie in (0, 1]", self.metric);
            }
        }
        let last = self.bands[self.bands.len() - 1];
        let exhaustive = match self.direction {
            Direction::HigherIsWorse => last.bound.is_infinite(),
            Direction::LowerIsWorse => last.bound <= 0.0,
        };
        if !exhaustive {
            anyhow::bail!("{}: bands do not cover the full value range", self.metric);
        }
        Ok(())
    }
}

pub fn validate_tables() -> anyhow::Result<()> {
    for table in [
        &LCP_TABLE,
        &INP_TABLE,
        &CLS_TABLE,
        &ACCESSIBILITY_TABLE,
        &MOBILE_TABLE,
    ] {
        table.validate()?;
    }
    let sum: f64 = FACTOR_WEIGHTS.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > 1e-9 {
        anyhow::bail!("factor weights sum to {}, expected 1.0", sum);
    }
    Ok(())
}

// ============================================================================
// Breakdown
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorImpact {
    pub severity: &'static str,
    pub revenue_loss: f64,
    pub percentage_of_baseline: f64,
    pub visitors_affected: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalLoss {
    pub monthly: f64,
    pub yearly: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialIncrease {
    pub monthly: f64,
    pub yearly: f64,
    pub roi_months: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueLossBreakdown {
    pub baseline_monthly_revenue: f64,
    pub lcp_impact: FactorImpact,
    pub inp_impact: FactorImpact,
    pub cls_impact: FactorImpact,
    pub accessibility_impact: FactorImpact,
    pub mobile_impact: FactorImpact,
    pub total_revenue_loss: TotalLoss,
    pub potential_revenue_increase: PotentialIncrease,
}

fn factor_impact(
    table: &FactorTable,
    value: f64,
    weight: f64,
    traffic_share: f64,
    baseline: f64,
    degenerate: bool,
) -> FactorImpact {
    let band = table.band_for(value);
    if degenerate {
        return FactorImpact {
            severity: band.label,
            revenue_loss: 0.0,
            percentage_of_baseline: 0.0,
            visitors_affected: 0.0,
        };
    }
    let loss_rate = 1.0 - band.factor;
    let revenue_loss = baseline * loss_rate * weight;
    FactorImpact {
        severity: band.label,
        revenue_loss,
        percentage_of_baseline: revenue_loss / baseline * 100.0,
        visitors_affected: traffic_share * loss_rate,
    }
}

/// Compute the full loss breakdown for one site.
///
/// Zero traffic (or a zero baseline) short-circuits to an all-zero,
/// well-formed breakdown; percentages are undefined there and must not be
/// computed.
pub fn compute(metrics: &WebsiteMetrics) -> RevenueLossBreakdown {
    let traffic = metrics.business.monthly_traffic as f64;
    let baseline = metrics.business.baseline_monthly_revenue();
    let degenerate = metrics.business.monthly_traffic == 0 || baseline <= 0.0;

    let mobile_score = if metrics.mobile_optimized { 100.0 } else { 0.0 };

    let lcp_impact = factor_impact(
        &LCP_TABLE,
        metrics.lcp_seconds,
        FACTOR_WEIGHTS[0].1,
        traffic,
        baseline,
        degenerate,
    );
    let inp_impact = factor_impact(
        &INP_TABLE,
        metrics.inp_milliseconds,
        FACTOR_WEIGHTS[1].1,
        traffic,
        baseline,
        degenerate,
    );
    let cls_impact = factor_impact(
        &CLS_TABLE,
        metrics.cls_score,
        FACTOR_WEIGHTS[2].1,
        traffic,
        baseline,
        degenerate,
    );
    let accessibility_impact = factor_impact(
        &ACCESSIBILITY_TABLE,
        metrics.accessibility_score as f64,
        FACTOR_WEIGHTS[3].1,
        traffic,
        baseline,
        degenerate,
    );
    let mobile_impact = factor_impact(
        &MOBILE_TABLE,
        mobile_score,
        FACTOR_WEIGHTS[4].1,
        traffic * MOBILE_TRAFFIC_SHARE,
        baseline,
        degenerate,
    );

    let (total, increase) = if degenerate {
        (
            TotalLoss { monthly: 0.0, yearly: 0.0, percentage: 0.0 },
            PotentialIncrease { monthly: 0.0, yearly: 0.0, roi_months: 0 },
        )
    } else {
        let impacts = [
            &lcp_impact,
            &inp_impact,
            &cls_impact,
            &accessibility_impact,
            &mobile_impact,
        ];
        aggregate(&impacts, traffic, baseline)
    };

    RevenueLossBreakdown {
        baseline_monthly_revenue: if degenerate { 0.0 } else { baseline },
        lcp_impact,
        inp_impact,
        cls_impact,
        accessibility_impact,
        mobile_impact,
        total_revenue_loss: total,
        potential_revenue_increase: increase,
    }
}

/// Summing per-factor visitor counts double-counts visitors hit by several
/// deficiencies at once. Known simplification: cap the unique estimate at
/// 60% of traffic and rescale the total from that share, rather than
/// modeling the actual overlap. Downstream urgency thresholds are tuned
/// against this heuristic's output, so keep it as is.
fn aggregate(impacts: &[&FactorImpact], traffic: f64, baseline: f64) -> (TotalLoss, PotentialIncrease) {
    let summed_visitors: f64 = impacts.iter().map(|i| i.visitors_affected).sum();
    let unique_visitors = summed_visitors.min(traffic * UNIQUE_VISITOR_CAP);

    let monthly = (unique_visitors / traffic) * baseline;
    let total = TotalLoss {
        monthly,
        yearly: monthly * 12.0,
        percentage: monthly / baseline * 100.0,
    };

    let recoverable = monthly * RECOVERABLE_LOSS_SHARE;
    let roi_months = if recoverable > 0.0 {
        (IMPLEMENTATION_COST / recoverable).ceil() as u32
    } else {
        0
    };
    let increase = PotentialIncrease {
        monthly: recoverable,
        yearly: recoverable * 12.0,
        roi_months,
    };

    (total, increase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::metrics::BusinessInputs;

    fn metrics(
        traffic: u64,
        conversion: f64,
        ticket: f64,
        lcp: f64,
        inp: f64,
        cls: f64,
        a11y: u8,
        mobile: bool,
    ) -> WebsiteMetrics {
        WebsiteMetrics {
            business: BusinessInputs {
                monthly_traffic: traffic,
                conversion_rate: conversion,
                average_ticket: ticket,
            },
            lcp_seconds: lcp,
            inp_milliseconds: inp,
            cls_score: cls,
            accessibility_score: a11y,
            mobile_optimized: mobile,
        }
    }

    #[test]
    fn test_all_tables_validate() {
        validate_tables().unwrap();
    }

    #[test]
    fn test_band_lookup_lcp() {
        assert_eq!(LCP_TABLE.band_for(1.8).label, "good");
        assert_eq!(LCP_TABLE.band_for(2.5).label, "good");
        assert_eq!(LCP_TABLE.band_for(3.0).label, "needs-improvement");
        assert_eq!(LCP_TABLE.band_for(5.2).label, "poor");
    }

    #[test]
    fn test_band_lookup_accessibility() {
        assert_eq!(ACCESSIBILITY_TABLE.band_for(95.0).label, "excellent");
        assert_eq!(ACCESSIBILITY_TABLE.band_for(90.0).label, "excellent");
        assert_eq!(ACCESSIBILITY_TABLE.band_for(80.0).label, "good");
        assert_eq!(ACCESSIBILITY_TABLE.band_for(65.0).label, "fair");
        assert_eq!(ACCESSIBILITY_TABLE.band_for(30.0).label, "poor");
    }

    #[test]
    fn test_validation_rejects_bad_best_factor() {
        static BAD: FactorTable = FactorTable {
            metric: "bad",
            direction: Direction::HigherIsWorse,
            bands: &[
                Band { label: "good", bound: 1.0, factor: 0.9 },
                Band { label: "poor", bound: f64::INFINITY, factor: 0.5 },
            ],
        };
        assert!(BAD.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_exhaustive_table() {
        static BAD: FactorTable = FactorTable {
            metric: "bad",
            direction: Direction::HigherIsWorse,
            bands: &[
                Band { label: "good", bound: 1.0, factor: 1.0 },
                Band { label: "poor", bound: 5.0, factor: 0.5 },
            ],
        };
        assert!(BAD.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_increasing_factors() {
        static BAD: FactorTable = FactorTable {
            metric: "bad",
            direction: Direction::HigherIsWorse,
            bands: &[
                Band { label: "good", bound: 1.0, factor: 1.0 },
                Band { label: "mid", bound: 2.0, factor: 0.5 },
                Band { label: "poor", bound: f64::INFINITY, factor: 0.9 },
            ],
        };
        assert!(BAD.validate().is_err());
    }

    #[test]
    fn test_healthy_site_loses_nothing() {
        let b = compute(&metrics(5_000, 3.0, 200.0, 1.8, 150.0, 0.05, 95, true));
        assert_eq!(b.total_revenue_loss.monthly, 0.0);
        assert_eq!(b.total_revenue_loss.percentage, 0.0);
        assert_eq!(b.lcp_impact.revenue_loss, 0.0);
        assert_eq!(b.mobile_impact.visitors_affected, 0.0);
        assert_eq!(b.potential_revenue_increase.roi_months, 0);
    }

    #[test]
    fn test_degraded_site_hits_the_unique_visitor_cap() {
        // All five factors at worst band: summed visitor share is
        // 0.28 + 0.20 + 0.15 + 0.12(fair) + 0.25*0.5, well past the cap.
        let b = compute(&metrics(10_000, 2.0, 500.0, 5.2, 600.0, 0.3, 65, false));
        assert!((b.baseline_monthly_revenue - 100_000.0).abs() < 1e-6);
        assert!((b.total_revenue_loss.percentage - 60.0).abs() < 1e-6);
        assert!((b.total_revenue_loss.monthly - 60_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_total_never_exceeds_baseline() {
        let b = compute(&metrics(100, 100.0, 10.0, 100.0, 10_000.0, 5.0, 0, false));
        assert!(b.total_revenue_loss.monthly <= b.baseline_monthly_revenue);
    }

    #[test]
    fn test_yearly_is_exactly_twelve_months() {
        let b = compute(&metrics(10_000, 2.0, 500.0, 5.2, 600.0, 0.3, 65, false));
        assert_eq!(b.total_revenue_loss.yearly, b.total_revenue_loss.monthly * 12.0);
        assert_eq!(
            b.potential_revenue_increase.yearly,
            b.potential_revenue_increase.monthly * 12.0
        );
    }

    #[test]
    fn test_lcp_monotonic_across_band_boundary() {
        let good = compute(&metrics(10_000, 2.0, 500.0, 2.4, 150.0, 0.05, 95, true));
        let mid = compute(&metrics(10_000, 2.0, 500.0, 3.0, 150.0, 0.05, 95, true));
        let poor = compute(&metrics(10_000, 2.0, 500.0, 4.5, 150.0, 0.05, 95, true));
        assert!(good.lcp_impact.revenue_loss < mid.lcp_impact.revenue_loss);
        assert!(mid.lcp_impact.revenue_loss < poor.lcp_impact.revenue_loss);
    }

    #[test]
    fn test_mobile_uses_half_traffic_share() {
        let b = compute(&metrics(10_000, 2.0, 500.0, 1.0, 100.0, 0.0, 100, false));
        // Mobile poor band: loss rate 0.25 applied to half the traffic.
        assert!((b.mobile_impact.visitors_affected - 10_000.0 * 0.5 * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_per_factor_loss_uses_weights() {
        let b = compute(&metrics(10_000, 2.0, 500.0, 5.2, 100.0, 0.0, 100, true));
        // LCP poor: 100_000 * 0.28 * 0.35
        assert!((b.lcp_impact.revenue_loss - 100_000.0 * 0.28 * 0.35).abs() < 1e-6);
        assert_eq!(b.inp_impact.revenue_loss, 0.0);
    }

    #[test]
    fn test_zero_traffic_short_circuits() {
        let b = compute(&metrics(0, 2.0, 500.0, 5.2, 600.0, 0.3, 65, false));
        assert_eq!(b.baseline_monthly_revenue, 0.0);
        assert_eq!(b.total_revenue_loss.monthly, 0.0);
        assert_eq!(b.total_revenue_loss.percentage, 0.0);
        assert_eq!(b.lcp_impact.revenue_loss, 0.0);
        assert_eq!(b.lcp_impact.visitors_affected, 0.0);
        assert_eq!(b.potential_revenue_increase.roi_months, 0);
        // Severity labels are still reported for a degenerate business.
        assert_eq!(b.lcp_impact.severity, "poor");
    }

    #[test]
    fn test_roi_months_from_recoverable_loss() {
        let b = compute(&metrics(10_000, 2.0, 500.0, 5.2, 600.0, 0.3, 65, false));
        // monthly loss 60_000 → recoverable 30_000 → ceil(5_000 / 30_000) = 1
        assert_eq!(b.potential_revenue_increase.roi_months, 1);
        assert!((b.potential_revenue_increase.monthly - 30_000.0).abs() < 1e-6);
    }
}
