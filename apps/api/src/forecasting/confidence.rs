//! Confidence Classifier — reliability tier from sample size and scatter.

use crate::forecasting::policy::ForecastPolicy;
use crate::models::forecast::Confidence;

/// Population variance (divides by `n`). Empty input yields 0.
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Tiers a forecast by the mean of the two series' variances and the bucket count.
///
/// With the default policy: `high` below variance 100 with at least 8 weeks,
/// `medium` below 200 with at least 5 weeks, `low` otherwise.
pub fn classify_confidence(
    response_rates: &[f64],
    interview_rates: &[f64],
    data_points: usize,
    policy: &ForecastPolicy,
) -> Confidence {
    let avg_variance =
        (population_variance(response_rates) + population_variance(interview_rates)) / 2.0;

    if avg_variance < policy.high_variance_ceiling && data_points >= policy.high_min_points {
        Confidence::High
    } else if avg_variance < policy.medium_variance_ceiling
        && data_points >= policy.medium_min_points
    {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}
