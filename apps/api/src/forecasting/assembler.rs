//! Forecast Assembler — runs the local pipeline for one variant.
//!
//! Flow: weekly buckets → trend fits → confidence → trend direction →
//!       current/predicted rates → chart series → recommendation.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::forecasting::aggregator::{aggregate_weekly, following_week_keys};
use crate::forecasting::confidence::classify_confidence;
use crate::forecasting::policy::ForecastPolicy;
use crate::forecasting::recommendation::{matching_rule, RecommendationInput};
use crate::forecasting::trend::TrendFit;
use crate::models::forecast::{ForecastPoint, ForecastSource, Trend, VariantForecast, WeeklyBucket};
use crate::models::outcome::VariantHistory;

/// Rates are percentages, so every projected value is pinned to 0–100.
pub fn clamp_rate(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Classifies an average weekly slope (percentage points per week).
pub fn classify_trend(average_slope: f64, policy: &ForecastPolicy) -> Trend {
    if average_slope > policy.trend_slope_threshold {
        Trend::Improving
    } else if average_slope < -policy.trend_slope_threshold {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// Aggregates a variant's records and assembles its forecast.
///
/// Returns `None` when the variant has too few populated weeks; callers leave
/// such variants out of the result rather than reporting placeholders.
pub fn forecast_variant(
    history: &VariantHistory,
    now: DateTime<Utc>,
    policy: &ForecastPolicy,
) -> Option<VariantForecast> {
    let buckets = aggregate_weekly(&history.records, now, policy.lookback_weeks);
    let forecast = assemble_forecast(&history.variant_id, &history.variant_title, &buckets, policy);
    if forecast.is_none() {
        debug!(
            "Variant {} has {} populated weeks; skipping local forecast",
            history.variant_id,
            buckets.len()
        );
    }
    forecast
}

/// Builds a forecast from already-aggregated buckets (ascending by week).
pub fn assemble_forecast(
    variant_id: &str,
    variant_title: &str,
    buckets: &[WeeklyBucket],
    policy: &ForecastPolicy,
) -> Option<VariantForecast> {
    // Two points is the least a line can be fitted through.
    let n = buckets.len();
    if n < policy.min_weeks.max(2) {
        return None;
    }
    let last = buckets.last()?;

    let response_rates: Vec<f64> = buckets.iter().map(|b| b.response_rate).collect();
    let interview_rates: Vec<f64> = buckets.iter().map(|b| b.interview_rate).collect();

    let response_fit = TrendFit::fit_series(&response_rates);
    let interview_fit = TrendFit::fit_series(&interview_rates);

    let confidence = classify_confidence(&response_rates, &interview_rates, n, policy);
    let trend = classify_trend((response_fit.slope + interview_fit.slope) / 2.0, policy);

    let current_response_rate = last.response_rate;
    let current_interview_rate = last.interview_rate;
    let predicted_response_rate = clamp_rate(response_fit.value_at(n));
    let predicted_interview_rate = clamp_rate(interview_fit.value_at(n));

    let mut chart: Vec<ForecastPoint> = buckets
        .iter()
        .map(|b| ForecastPoint::actual(b.week_key.clone(), b.response_rate, b.interview_rate))
        .collect();
    let labels = following_week_keys(last.week_start, policy.horizon_weeks);
    chart.extend(labels.into_iter().enumerate().map(|(step, label)| {
        ForecastPoint::predicted(
            label,
            clamp_rate(response_fit.value_at(n + step)),
            clamp_rate(interview_fit.value_at(n + step)),
        )
    }));

    let rule = matching_rule(
        &RecommendationInput {
            trend,
            current_interview_rate,
            predicted_interview_rate,
        },
        policy,
    );
    debug!("Variant {variant_id}: {trend:?}, {confidence:?}, rule {}", rule.name);

    Some(VariantForecast {
        variant_id: variant_id.to_string(),
        variant_title: variant_title.to_string(),
        current_response_rate,
        current_interview_rate,
        predicted_response_rate,
        predicted_interview_rate,
        confidence,
        trend,
        recommendation: rule.template.to_string(),
        data_points: n,
        chart,
        source: ForecastSource::Local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecasting::recommendation::{DECLINING_AND_LOW, STEADY, STRONG_IMPROVING};
    use crate::models::forecast::Confidence;
    use crate::models::outcome::OutcomeRecord;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn bucket(week: u32, response_rate: f64, interview_rate: f64) -> WeeklyBucket {
        let week_start = NaiveDate::from_isoywd_opt(2026, week, chrono::Weekday::Mon).unwrap();
        WeeklyBucket {
            week_key: format!("2026-W{week:02}"),
            week_start,
            total: 10,
            responses: (response_rate / 10.0) as u32,
            interviews: (interview_rate / 10.0) as u32,
            response_rate,
            interview_rate,
        }
    }

    fn series(rates: &[(f64, f64)]) -> Vec<WeeklyBucket> {
        rates
            .iter()
            .enumerate()
            .map(|(i, &(r, iv))| bucket(10 + i as u32, r, iv))
            .collect()
    }

    #[test]
    fn test_linear_three_week_scenario() {
        let buckets = series(&[(10.0, 5.0), (20.0, 10.0), (30.0, 15.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &buckets, &ForecastPolicy::default()).unwrap();

        assert!((forecast.predicted_response_rate - 40.0).abs() < 1e-9);
        assert!((forecast.predicted_interview_rate - 20.0).abs() < 1e-9);
        assert_eq!(forecast.current_response_rate, 30.0);
        assert_eq!(forecast.current_interview_rate, 15.0);
        assert_eq!(forecast.trend, Trend::Improving);
        assert_eq!(forecast.confidence, Confidence::Low);
        assert_eq!(forecast.data_points, 3);
        assert_eq!(forecast.recommendation, STRONG_IMPROVING);
        assert_eq!(forecast.source, ForecastSource::Local);
    }

    #[test]
    fn test_fewer_than_three_weeks_is_insufficient() {
        let buckets = series(&[(10.0, 5.0), (20.0, 10.0)]);
        assert!(assemble_forecast("A", "Backend", &buckets, &ForecastPolicy::default()).is_none());
        assert!(assemble_forecast("A", "Backend", &[], &ForecastPolicy::default()).is_none());
    }

    #[test]
    fn test_predictions_are_clamped() {
        let rising = series(&[(60.0, 70.0), (80.0, 85.0), (100.0, 100.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &rising, &ForecastPolicy::default()).unwrap();
        assert_eq!(forecast.predicted_response_rate, 100.0);
        assert_eq!(forecast.predicted_interview_rate, 100.0);

        let falling = series(&[(40.0, 20.0), (20.0, 10.0), (0.0, 0.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &falling, &ForecastPolicy::default()).unwrap();
        assert_eq!(forecast.predicted_response_rate, 0.0);
        assert_eq!(forecast.predicted_interview_rate, 0.0);
        assert_eq!(forecast.trend, Trend::Declining);
        assert_eq!(forecast.recommendation, DECLINING_AND_LOW);
        for point in forecast.chart.iter().filter(|p| p.is_prediction) {
            assert_eq!(point.predicted_response, Some(0.0));
            assert_eq!(point.predicted_interview, Some(0.0));
        }
    }

    #[test]
    fn test_chart_separates_actual_and_predicted_points() {
        let buckets = series(&[(10.0, 5.0), (25.0, 10.0), (15.0, 5.0), (30.0, 20.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &buckets, &ForecastPolicy::default()).unwrap();

        assert_eq!(forecast.chart.len(), 4 + 4);
        for (i, point) in forecast.chart.iter().enumerate() {
            if i < 4 {
                assert!(!point.is_prediction);
                assert!(point.actual_response.is_some() && point.actual_interview.is_some());
                assert!(point.predicted_response.is_none() && point.predicted_interview.is_none());
            } else {
                assert!(point.is_prediction);
                assert!(point.predicted_response.is_some() && point.predicted_interview.is_some());
                assert!(point.actual_response.is_none() && point.actual_interview.is_none());
            }
        }
        let labels: Vec<_> = forecast.chart.iter().map(|p| p.week_label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "2026-W10", "2026-W11", "2026-W12", "2026-W13", "2026-W14", "2026-W15",
                "2026-W16", "2026-W17"
            ]
        );
    }

    #[test]
    fn test_first_forecast_point_matches_predicted_rates() {
        let buckets = series(&[(10.0, 5.0), (25.0, 10.0), (15.0, 5.0), (30.0, 20.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &buckets, &ForecastPolicy::default()).unwrap();
        let first = forecast.chart.iter().find(|p| p.is_prediction).unwrap();
        assert_eq!(first.predicted_response, Some(forecast.predicted_response_rate));
        assert_eq!(first.predicted_interview, Some(forecast.predicted_interview_rate));
    }

    #[test]
    fn test_horizon_follows_policy() {
        let policy = ForecastPolicy {
            horizon_weeks: 2,
            ..ForecastPolicy::default()
        };
        let buckets = series(&[(10.0, 5.0), (20.0, 10.0), (30.0, 15.0)]);
        let forecast = assemble_forecast("A", "Backend", &buckets, &policy).unwrap();
        assert_eq!(forecast.chart.iter().filter(|p| p.is_prediction).count(), 2);
    }

    #[test]
    fn test_trend_classification_is_symmetric() {
        let policy = ForecastPolicy::default();
        for slope in [0.5, 2.0, 2.5, 7.5, 40.0] {
            let up = classify_trend(slope, &policy);
            let down = classify_trend(-slope, &policy);
            match up {
                Trend::Improving => assert_eq!(down, Trend::Declining),
                Trend::Stable => assert_eq!(down, Trend::Stable),
                Trend::Declining => panic!("positive slope {slope} classified as declining"),
            }
        }
        assert_eq!(classify_trend(0.0, &policy), Trend::Stable);
    }

    #[test]
    fn test_flat_series_is_stable() {
        let buckets = series(&[(20.0, 10.0), (20.0, 10.0), (20.0, 10.0)]);
        let forecast =
            assemble_forecast("A", "Backend", &buckets, &ForecastPolicy::default()).unwrap();
        assert_eq!(forecast.trend, Trend::Stable);
        assert_eq!(forecast.recommendation, STEADY);
    }

    #[test]
    fn test_local_pipeline_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2026, 3, 18, 12, 0, 0).unwrap();
        let records: Vec<OutcomeRecord> = (0..30)
            .map(|i| OutcomeRecord {
                variant_id: "A".to_string(),
                applied_at: now - Duration::days(i * 2),
                response_received: i % 3 == 0,
                interview_granted: i % 5 == 0,
                company: None,
                job_title: None,
            })
            .collect();
        let history = VariantHistory {
            variant_id: "A".to_string(),
            variant_title: "Backend".to_string(),
            records,
        };

        let policy = ForecastPolicy::default();
        let first = forecast_variant(&history, now, &policy).unwrap();
        let second = forecast_variant(&history, now, &policy).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.predicted_response_rate.to_bits(),
            second.predicted_response_rate.to_bits()
        );
    }
}
