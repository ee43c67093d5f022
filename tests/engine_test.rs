//! End-to-end pipeline tests over canned diagnostic reports.

use arco_impact::engine;
use arco_impact::engine::metrics::BusinessInputs;
use arco_impact::engine::urgency::LeadTier;
use arco_impact::pagespeed::PageSpeedReport;

/// A badly degraded site: slow paint, sluggish interaction, unstable
/// layout, weak accessibility, no mobile viewport.
fn degraded_report() -> PageSpeedReport {
    serde_json::from_str(
        r#"{
        "lighthouseResult": {
            "categories": {
                "performance": {"score": 0.35},
                "seo": {"score": 0.70},
                "accessibility": {"score": 0.65},
                "best-practices": {"score": 0.60}
            },
            "audits": {
                "largest-contentful-paint": {"numericValue": 5200.0, "score": 0.1},
                "interaction-to-next-paint": {"numericValue": 600.0, "score": 0.2},
                "cumulative-layout-shift": {"numericValue": 0.3, "score": 0.2},
                "viewport": {"score": 0.0},
                "render-blocking-resources": {
                    "title": "Eliminate render-blocking resources",
                    "description": "Resources are blocking first paint.",
                    "score": 0.2,
                    "details": {"type": "opportunity", "overallSavingsMs": 1800}
                },
                "uses-optimized-images": {
                    "title": "Efficiently encode images",
                    "description": "Optimized images load faster.",
                    "score": 0.4,
                    "details": {"type": "opportunity", "overallSavingsMs": 750}
                }
            },
            "fetchTime": "2025-11-03T12:00:00.000Z"
        },
        "analysisUTCTimestamp": "2025-11-03T12:00:00.000Z"
    }"#,
    )
    .unwrap()
}

/// A healthy site: every vital in its best band, mobile viewport present.
fn healthy_report() -> PageSpeedReport {
    serde_json::from_str(
        r#"{
        "lighthouseResult": {
            "categories": {
                "performance": {"score": 0.98},
                "seo": {"score": 0.95},
                "accessibility": {"score": 0.95},
                "best-practices": {"score": 0.92}
            },
            "audits": {
                "largest-contentful-paint": {"numericValue": 1800.0, "score": 0.95},
                "interaction-to-next-paint": {"numericValue": 150.0, "score": 0.98},
                "cumulative-layout-shift": {"numericValue": 0.05, "score": 0.99},
                "viewport": {"score": 1.0}
            }
        }
    }"#,
    )
    .unwrap()
}

fn scenario_a_business() -> BusinessInputs {
    BusinessInputs {
        monthly_traffic: 10_000,
        conversion_rate: 2.0,
        average_ticket: 500.0,
    }
}

fn scenario_b_business() -> BusinessInputs {
    BusinessInputs {
        monthly_traffic: 5_000,
        conversion_rate: 3.0,
        average_ticket: 200.0,
    }
}

#[test]
fn test_scenario_a_degraded_site_is_hot() {
    let outcome = engine::run(&degraded_report(), scenario_a_business());
    let impact = &outcome.revenue_impact;

    assert!(
        impact.breakdown.total_revenue_loss.percentage > 20.0,
        "expected material loss, got {}%",
        impact.breakdown.total_revenue_loss.percentage
    );
    assert_eq!(impact.lead_tier, LeadTier::Hot);
    assert!(impact.urgency_score >= 75);
}

#[test]
fn test_scenario_b_healthy_site_is_cold() {
    let outcome = engine::run(&healthy_report(), scenario_b_business());
    let impact = &outcome.revenue_impact;

    assert_eq!(impact.breakdown.total_revenue_loss.monthly, 0.0);
    assert_eq!(impact.lead_tier, LeadTier::Cold);
}

#[test]
fn test_scores_stay_in_range() {
    for (report, business) in [
        (degraded_report(), scenario_a_business()),
        (healthy_report(), scenario_b_business()),
    ] {
        let outcome = engine::run(&report, business);
        assert!(outcome.composite_score <= 100);
        assert!(outcome.revenue_impact.urgency_score >= 1);
        assert!(outcome.revenue_impact.urgency_score <= 100);
    }
}

#[test]
fn test_total_loss_bounded_by_baseline() {
    let outcome = engine::run(&degraded_report(), scenario_a_business());
    let b = &outcome.revenue_impact.breakdown;
    assert!(b.total_revenue_loss.monthly <= b.baseline_monthly_revenue);
}

#[test]
fn test_yearly_is_monthly_times_twelve() {
    let outcome = engine::run(&degraded_report(), scenario_a_business());
    let total = &outcome.revenue_impact.breakdown.total_revenue_loss;
    assert_eq!(total.yearly, total.monthly * 12.0);
}

#[test]
fn test_pipeline_is_idempotent() {
    let first = engine::run(&degraded_report(), scenario_a_business());
    let second = engine::run(&degraded_report(), scenario_a_business());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_opportunities_ranked_and_tiered() {
    let outcome = engine::run(&degraded_report(), scenario_a_business());
    assert_eq!(outcome.opportunities.len(), 2);
    assert_eq!(outcome.opportunities[0].id, "render-blocking-resources");
    assert_eq!(outcome.opportunities[0].savings_ms, 1800.0);
    assert!(outcome.opportunities[0].savings_ms > outcome.opportunities[1].savings_ms);
}

#[test]
fn test_zero_traffic_yields_zero_breakdown() {
    let business = BusinessInputs {
        monthly_traffic: 0,
        conversion_rate: 2.0,
        average_ticket: 500.0,
    };
    let outcome = engine::run(&degraded_report(), business);
    let b = &outcome.revenue_impact.breakdown;
    assert_eq!(b.baseline_monthly_revenue, 0.0);
    assert_eq!(b.total_revenue_loss.monthly, 0.0);
    assert_eq!(b.total_revenue_loss.percentage, 0.0);
    assert_eq!(b.potential_revenue_increase.roi_months, 0);
}

#[test]
fn test_outcome_serializes_with_camel_case_contract() {
    let outcome = engine::run(&degraded_report(), scenario_a_business());
    let json = serde_json::to_value(&outcome).unwrap();

    assert!(json["compositeScore"].is_number());
    assert!(json["categoryScores"]["bestPractices"].is_number());
    assert!(json["coreWebVitals"]["lcpSeconds"].is_number());
    let impact = &json["revenueImpact"];
    assert!(impact["totalRevenueLoss"]["monthly"].is_number());
    assert!(impact["potentialRevenueIncrease"]["roiMonths"].is_number());
    assert!(impact["lcpImpact"]["visitorsAffected"].is_number());
    assert_eq!(impact["leadTier"], "hot");
    assert!(impact["urgencyScore"].is_number());
}

#[test]
fn test_real_user_data_passes_through_when_present() {
    let raw = r#"{
        "lighthouseResult": {"categories": {}, "audits": {}},
        "loadingExperience": {
            "metrics": {
                "LARGEST_CONTENTFUL_PAINT_MS": {"percentile": 3100, "category": "SLOW"}
            },
            "overall_category": "SLOW"
        }
    }"#;
    let report: PageSpeedReport = serde_json::from_str(raw).unwrap();
    let outcome = engine::run(&report, scenario_b_business());
    let rud = outcome.real_user_data.expect("field data should survive");
    assert_eq!(rud.lcp_percentile_ms, Some(3100.0));

    let without = engine::run(&healthy_report(), scenario_b_business());
    assert!(without.real_user_data.is_none());
}
