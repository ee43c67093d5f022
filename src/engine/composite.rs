//! ARCO composite index: one 0–100 quality figure blending the four
//! Lighthouse category scores under fixed weights.

use super::metrics::CategoryScores;

/// Category weights, in (performance, seo, accessibility, best-practices)
/// order. Must sum to 1.0, checked once at startup rather than per request.
pub const COMPOSITE_WEIGHTS: [(&str, f64); 4] = [
    ("performance", 0.40),
    ("seo", 0.25),
    ("accessibility", 0.20),
    ("best-practices", 0.15),
];

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

pub fn validate_weights() -> anyhow::Result<()> {
    let sum: f64 = COMPOSITE_WEIGHTS.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        anyhow::bail!("composite weights sum to {}, expected 1.0", sum);
    }
    if COMPOSITE_WEIGHTS.iter().any(|(_, w)| *w <= 0.0) {
        anyhow::bail!("composite weights must all be positive");
    }
    Ok(())
}

/// Weighted average of the category scores, rounded to the nearest integer
/// and clamped to [0, 100]. Pure.
pub fn composite_score(scores: &CategoryScores) -> u8 {
    let weighted = scores.performance as f64 * COMPOSITE_WEIGHTS[0].1
        + scores.seo as f64 * COMPOSITE_WEIGHTS[1].1
        + scores.accessibility as f64 * COMPOSITE_WEIGHTS[2].1
        + scores.best_practices as f64 * COMPOSITE_WEIGHTS[3].1;
    weighted.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        validate_weights().unwrap();
    }

    #[test]
    fn test_perfect_scores_give_100() {
        let scores = CategoryScores {
            performance: 100,
            seo: 100,
            accessibility: 100,
            best_practices: 100,
        };
        assert_eq!(composite_score(&scores), 100);
    }

    #[test]
    fn test_zero_scores_give_0() {
        let scores = CategoryScores {
            performance: 0,
            seo: 0,
            accessibility: 0,
            best_practices: 0,
        };
        assert_eq!(composite_score(&scores), 0);
    }

    #[test]
    fn test_weighted_blend() {
        // 40*0.40 + 90*0.25 + 60*0.20 + 80*0.15 = 16 + 22.5 + 12 + 12 = 62.5 → 63
        let scores = CategoryScores {
            performance: 40,
            seo: 90,
            accessibility: 60,
            best_practices: 80,
        };
        assert_eq!(composite_score(&scores), 63);
    }

    #[test]
    fn test_performance_weighs_heaviest() {
        let perf_poor = CategoryScores {
            performance: 0,
            seo: 100,
            accessibility: 100,
            best_practices: 100,
        };
        let seo_poor = CategoryScores {
            performance: 100,
            seo: 0,
            accessibility: 100,
            best_practices: 100,
        };
        assert!(composite_score(&perf_poor) < composite_score(&seo_poor));
    }
}
