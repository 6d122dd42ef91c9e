//! Weighted severity scoring
//!
//! Sub-scores live on a 0-10 scale. The weighted score is a fixed linear
//! combination and never depends on how the sub-scores were obtained.

pub const IMPACT_WEIGHT: f64 = 0.5;
pub const FREQUENCY_WEIGHT: f64 = 0.3;
pub const RECOVERY_WEIGHT: f64 = 0.2;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Score assumed when the model does not provide one
pub const DEFAULT_SCORE: f64 = 5.0;

/// Clamp a sub-score into `[0, 10]`
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return DEFAULT_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// `0.5 * impact + 0.3 * frequency + 0.2 * recovery`
pub fn weighted_score(impact: f64, frequency: f64, recovery: f64) -> f64 {
    IMPACT_WEIGHT * impact + FREQUENCY_WEIGHT * frequency + RECOVERY_WEIGHT * recovery
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(20.0), 10.0);
        assert_eq!(clamp_score(7.5), 7.5);
        assert_eq!(clamp_score(f64::INFINITY), 10.0);
        assert_eq!(clamp_score(f64::NEG_INFINITY), 0.0);
        assert_eq!(clamp_score(f64::NAN), DEFAULT_SCORE);
    }

    #[test]
    fn test_clamp_always_in_range() {
        for raw in [-1e12, -10.5, -0.0001, 0.0, 3.3, 9.9999, 10.0, 10.0001, 1e12] {
            let clamped = clamp_score(raw);
            assert!((MIN_SCORE..=MAX_SCORE).contains(&clamped), "{raw} -> {clamped}");
        }
    }

    #[test]
    fn test_weighted_score_formula() {
        assert!(approx(weighted_score(9.0, 10.0, 0.0), 7.5));
        assert!(approx(weighted_score(5.0, 5.0, 5.0), 5.0));
        assert!(approx(weighted_score(10.0, 10.0, 10.0), 10.0));
        assert!(approx(weighted_score(0.0, 0.0, 0.0), 0.0));
        assert!(approx(weighted_score(2.0, 4.0, 8.0), 1.0 + 1.2 + 1.6));
    }

    #[test]
    fn test_weights_sum_to_one() {
        assert!(approx(IMPACT_WEIGHT + FREQUENCY_WEIGHT + RECOVERY_WEIGHT, 1.0));
    }
}
