//! Uncertainty calculation
//!
//! Quality coefficients and sibling uncertainties are multiplicative
//! (log-normal) errors: they combine as `exp(sqrt(Σ ln(x)²))`, never as a
//! plain sum or product.

use crate::emission::EmissionSource;
use crate::quality::QualityDimension;
use serde::{Deserialize, Serialize};

/// Exponent applied to the standard deviation factor for a 95% interval
pub const CONFIDENCE_95_EXPONENT: f64 = 1.96;

/// Upper standard-deviation bound of ratings 5, 4, 3 and 2
///
/// Anything above the last bound (or NaN) rates 1.
const RATING_THRESHOLDS: [(f64, u8); 4] = [(1.10, 5), (1.25, 4), (1.50, 3), (2.00, 2)];

/// Coefficients present on `source`, falling back per dimension to the
/// emission factor's own ratings
fn coefficients(source: &EmissionSource) -> Vec<f64> {
    QualityDimension::all_variants()
        .iter()
        .filter_map(|dim| {
            dim.coefficient(source.quality.get(*dim)).or_else(|| {
                source
                    .factor_quality
                    .as_ref()
                    .and_then(|factor| dim.coefficient(factor.get(*dim)))
            })
        })
        .collect()
}

/// Log-normal combination of independent multiplicative factors
fn log_combine(factors: impl IntoIterator<Item = f64>) -> f64 {
    let sum_of_squares: f64 = factors.into_iter().map(|f| f.ln().powi(2)).sum();
    sum_of_squares.sqrt().exp()
}

/// Multiplicative standard deviation factor of an emission source
///
/// Unrated or invalid dimensions are skipped. Returns exactly `1.0` when no
/// dimension is rated.
pub fn standard_deviation(source: &EmissionSource) -> f64 {
    let coefficients = coefficients(source);
    if coefficients.is_empty() {
        return 1.0;
    }
    log_combine(coefficients)
}

/// Standard deviation of `source`, or `None` when neither the source nor its
/// emission factor rates any dimension
///
/// Aggregation uses this form: a source with no quality signal at all must
/// not make its subtree look precise.
pub fn source_uncertainty(source: &EmissionSource) -> Option<f64> {
    let coefficients = coefficients(source);
    if coefficients.is_empty() {
        None
    } else {
        Some(log_combine(coefficients))
    }
}

/// 1–5 quality rating of a standard deviation factor (5 = most precise)
///
/// Monotonic: a smaller standard deviation never rates lower.
pub fn rating(standard_deviation: f64) -> u8 {
    RATING_THRESHOLDS
        .iter()
        .find(|(bound, _)| standard_deviation <= *bound)
        .map(|(_, rating)| *rating)
        .unwrap_or(1)
}

/// Combine sibling uncertainties into the uncertainty of their sum
///
/// Each item is `(value, standard_deviation)`. Siblings are independent
/// multiplicative errors weighted by their share of the total:
/// `exp(sqrt(Σ (v_i / V)² · ln(sd_i)²))`. When every value is 0 the siblings
/// weigh equally. Returns `None` for an empty slice or an unusable factor.
pub fn combine_standard_deviations(items: &[(f64, f64)]) -> Option<f64> {
    if items.is_empty() || items.iter().any(|(_, sd)| !sd.is_finite() || *sd <= 0.0) {
        return None;
    }

    let total: f64 = items.iter().map(|(value, _)| value.max(0.0)).sum();
    let equal_weight = 1.0 / items.len() as f64;

    let sum_of_squares: f64 = items
        .iter()
        .map(|(value, sd)| {
            let weight = if total > 0.0 { value.max(0.0) / total } else { equal_weight };
            (weight * sd.ln()).powi(2)
        })
        .sum();

    Some(sum_of_squares.sqrt().exp())
}

/// 95% confidence interval around a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub value: f64,
    pub upper: f64,
}

/// Log-normal 95% interval: `[value / sd^1.96, value × sd^1.96]`
pub fn confidence_interval(value: f64, standard_deviation: f64) -> ConfidenceInterval {
    let spread = standard_deviation.powf(CONFIDENCE_95_EXPONENT);
    ConfidenceInterval {
        lower: value / spread,
        value,
        upper: value * spread,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::QualityRatings;
    use crate::taxonomy::SubPost;

    fn source_with(quality: QualityRatings) -> EmissionSource {
        EmissionSource::new(SubPost::Electricity, Some(100.0)).with_quality(quality)
    }

    #[test]
    fn test_no_rating_is_exactly_one() {
        let source = source_with(QualityRatings::default());
        assert_eq!(standard_deviation(&source), 1.0);
        assert_eq!(source_uncertainty(&source), None);
        assert_eq!(rating(standard_deviation(&source)), 5);
    }

    #[test]
    fn test_single_dimension_equals_its_coefficient() {
        let source = source_with(QualityRatings::default().with(QualityDimension::TechnicalRepresentativeness, 1.0));
        assert!((standard_deviation(&source) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_log_normal_combination() {
        let source = source_with(
            QualityRatings::default()
                .with(QualityDimension::Reliability, 1.0)
                .with(QualityDimension::Completeness, 2.0),
        );
        let expected = (1.5f64.ln().powi(2) + 1.1f64.ln().powi(2)).sqrt().exp();
        assert!((standard_deviation(&source) - expected).abs() < 1e-12);
        // Not a product of the coefficients
        assert!((standard_deviation(&source) - 1.5 * 1.1).abs() > 1e-3);
    }

    #[test]
    fn test_all_best_ratings() {
        let source = source_with(QualityRatings::uniform(5));
        assert_eq!(standard_deviation(&source), 1.0);
        assert_eq!(source_uncertainty(&source), Some(1.0));
    }

    #[test]
    fn test_all_worst_ratings() {
        let source = source_with(QualityRatings::uniform(1));
        let sd = standard_deviation(&source);
        let expected = [1.5f64, 2.0, 1.1, 1.5, 1.2]
            .iter()
            .map(|c| c.ln().powi(2))
            .sum::<f64>()
            .sqrt()
            .exp();
        assert!((sd - expected).abs() < 1e-12);
        assert_eq!(rating(sd), 1);
    }

    #[test]
    fn test_invalid_ratings_degrade_silently() {
        let source = source_with(
            QualityRatings::default()
                .with(QualityDimension::Reliability, f64::NAN)
                .with(QualityDimension::Completeness, 7.0)
                .with(QualityDimension::TemporalRepresentativeness, 2.0),
        );
        assert!((standard_deviation(&source) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_factor_quality_fallback_per_dimension() {
        let source = source_with(QualityRatings::default().with(QualityDimension::Reliability, 1.0))
            .with_factor_quality(
                QualityRatings::default()
                    .with(QualityDimension::Reliability, 5.0)
                    .with(QualityDimension::TechnicalRepresentativeness, 1.0),
            );
        // Own reliability (1.5) wins; technical comes from the factor (2.0)
        let expected = (1.5f64.ln().powi(2) + 2.0f64.ln().powi(2)).sqrt().exp();
        assert!((standard_deviation(&source) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_own_rating_falls_back_to_factor() {
        let source = source_with(QualityRatings::default().with(QualityDimension::Reliability, 0.0))
            .with_factor_quality(QualityRatings::default().with(QualityDimension::Reliability, 2.0));
        assert!((standard_deviation(&source) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(rating(1.0), 5);
        assert_eq!(rating(1.10), 5);
        assert_eq!(rating(1.2), 4);
        assert_eq!(rating(1.4), 3);
        assert_eq!(rating(1.9), 2);
        assert_eq!(rating(2.5), 1);
        assert_eq!(rating(f64::NAN), 1);
    }

    #[test]
    fn test_rating_is_monotonic() {
        let mut previous = rating(1.0);
        let mut sd = 1.0;
        while sd < 4.0 {
            sd += 0.001;
            let current = rating(sd);
            assert!(current <= previous, "rating rose from {} to {} at {}", previous, current, sd);
            previous = current;
        }
    }

    #[test]
    fn test_confidence_interval() {
        let ci = confidence_interval(1000.0, 1.5);
        let spread = 1.5f64.powf(1.96);
        assert!((ci.lower - 1000.0 / spread).abs() < 1e-9);
        assert!((ci.upper - 1000.0 * spread).abs() < 1e-9);
        assert_eq!(ci.value, 1000.0);

        let exact = confidence_interval(42.0, 1.0);
        assert_eq!(exact.lower, 42.0);
        assert_eq!(exact.upper, 42.0);
    }

    #[test]
    fn test_combine_single_sibling_is_identity() {
        let sd = combine_standard_deviations(&[(500.0, 1.7)]).unwrap();
        assert!((sd - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_combine_weights_by_share() {
        let sd = combine_standard_deviations(&[(300.0, 2.0), (100.0, 1.5)]).unwrap();
        let expected = ((0.75 * 2.0f64.ln()).powi(2) + (0.25 * 1.5f64.ln()).powi(2)).sqrt().exp();
        assert!((sd - expected).abs() < 1e-12);
    }

    #[test]
    fn test_combine_zero_total_uses_equal_weights() {
        let sd = combine_standard_deviations(&[(0.0, 2.0), (0.0, 2.0)]).unwrap();
        let expected = (2.0 * (0.5 * 2.0f64.ln()).powi(2)).sqrt().exp();
        assert!((sd - expected).abs() < 1e-12);
    }

    #[test]
    fn test_combine_rejects_empty_and_unusable() {
        assert_eq!(combine_standard_deviations(&[]), None);
        assert_eq!(combine_standard_deviations(&[(1.0, f64::NAN)]), None);
        assert_eq!(combine_standard_deviations(&[(1.0, 0.0)]), None);
    }
}
