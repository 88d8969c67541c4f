//! Remote Forecast Adapter — asks the learned-model service for forecasts and
//! maps its answer onto `VariantForecast`.
//!
//! All-or-nothing: any failure makes the whole request `RemoteUnavailable` and
//! the caller runs the local pipeline for every variant instead.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::forecast_client::{
    ForecastClient, ForecastClientError, RemoteApplication, RemoteForecastRequest,
    RemotePrediction, RemoteVariantInput,
};
use crate::forecasting::aggregator::{aggregate_weekly, following_week_keys, week_start};
use crate::forecasting::assembler::{clamp_rate, classify_trend};
use crate::forecasting::policy::ForecastPolicy;
use crate::models::forecast::{ForecastPoint, ForecastSource, VariantForecast};
use crate::models::outcome::VariantHistory;

/// The remote forecaster trait. `ForecastClient` is the production backend;
/// tests plug in stubs.
#[async_trait]
pub trait RemoteForecaster: Send + Sync {
    async fn predict(
        &self,
        request: &RemoteForecastRequest,
    ) -> Result<Vec<RemotePrediction>, ForecastClientError>;
}

#[async_trait]
impl RemoteForecaster for ForecastClient {
    async fn predict(
        &self,
        request: &RemoteForecastRequest,
    ) -> Result<Vec<RemotePrediction>, ForecastClientError> {
        ForecastClient::predict(self, request).await
    }
}

#[derive(Debug, Error)]
pub enum RemoteUnavailable {
    #[error("remote forecasting is not configured")]
    NotConfigured,

    #[error("no variant has at least {0} applications")]
    NoEligibleVariants(usize),

    #[error("forecast service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("forecast service returned no usable predictions")]
    NoUsablePredictions,

    #[error(transparent)]
    Client(#[from] ForecastClientError),
}

/// Builds the batched request from every variant with enough raw history.
pub fn build_request(histories: &[VariantHistory], policy: &ForecastPolicy) -> RemoteForecastRequest {
    RemoteForecastRequest {
        variants: histories
            .iter()
            .filter(|h| h.records.len() >= policy.min_remote_applications)
            .map(|h| RemoteVariantInput {
                variant_id: h.variant_id.clone(),
                variant_title: h.variant_title.clone(),
                applications: h.records.iter().map(RemoteApplication::from).collect(),
            })
            .collect(),
    }
}

/// Issues one remote call for the whole request, bounded by `timeout`.
///
/// Forecasts come back in the order of `histories`. Predictions for variants
/// that were not asked about are dropped.
pub async fn fetch_remote_forecasts(
    remote: Option<&dyn RemoteForecaster>,
    histories: &[VariantHistory],
    now: DateTime<Utc>,
    policy: &ForecastPolicy,
    timeout: Duration,
) -> Result<Vec<VariantForecast>, RemoteUnavailable> {
    let remote = remote.ok_or(RemoteUnavailable::NotConfigured)?;

    let request = build_request(histories, policy);
    if request.variants.is_empty() {
        return Err(RemoteUnavailable::NoEligibleVariants(
            policy.min_remote_applications,
        ));
    }

    let predictions = tokio::time::timeout(timeout, remote.predict(&request))
        .await
        .map_err(|_| RemoteUnavailable::Timeout(timeout))??;
    if predictions.is_empty() {
        return Err(ForecastClientError::EmptyPredictions.into());
    }

    for p in &predictions {
        if !request.variants.iter().any(|v| v.variant_id == p.variant_id) {
            warn!("Ignoring remote prediction for unrequested variant {}", p.variant_id);
        }
    }

    let forecasts: Vec<VariantForecast> = histories
        .iter()
        .filter(|h| request.variants.iter().any(|v| v.variant_id == h.variant_id))
        .filter_map(|history| {
            predictions
                .iter()
                .find(|p| p.variant_id == history.variant_id)
                .map(|p| adapt_prediction(p, history, now, policy))
        })
        .collect();

    if forecasts.is_empty() {
        return Err(RemoteUnavailable::NoUsablePredictions);
    }
    Ok(forecasts)
}

/// Maps one remote prediction onto the shared forecast shape.
///
/// The service reports no weekly series, so the chart's history comes from the
/// local weekly aggregation and its horizon holds the predicted rates flat.
pub fn adapt_prediction(
    prediction: &RemotePrediction,
    history: &VariantHistory,
    now: DateTime<Utc>,
    policy: &ForecastPolicy,
) -> VariantForecast {
    let current_response_rate = clamp_rate(prediction.current_response_rate);
    let current_interview_rate = clamp_rate(prediction.current_interview_rate);
    let predicted_response_rate = clamp_rate(prediction.predicted_response_rate);
    let predicted_interview_rate = clamp_rate(prediction.predicted_interview_rate);

    let average_delta = ((predicted_response_rate - current_response_rate)
        + (predicted_interview_rate - current_interview_rate))
        / 2.0;

    let buckets = aggregate_weekly(&history.records, now, policy.lookback_weeks);
    let mut chart: Vec<ForecastPoint> = buckets
        .iter()
        .map(|b| ForecastPoint::actual(b.week_key.clone(), b.response_rate, b.interview_rate))
        .collect();
    let horizon_start = buckets
        .last()
        .map(|b| b.week_start)
        .unwrap_or_else(|| week_start(now.date_naive()));
    chart.extend(
        following_week_keys(horizon_start, policy.horizon_weeks)
            .into_iter()
            .map(|label| {
                ForecastPoint::predicted(label, predicted_response_rate, predicted_interview_rate)
            }),
    );

    VariantForecast {
        variant_id: history.variant_id.clone(),
        variant_title: prediction.variant_title.clone(),
        current_response_rate,
        current_interview_rate,
        predicted_response_rate,
        predicted_interview_rate,
        confidence: prediction.confidence,
        trend: classify_trend(average_delta, policy),
        recommendation: compose_recommendation(prediction),
        data_points: prediction.data_points.unwrap_or(buckets.len()),
        chart,
        source: ForecastSource::Remote,
    }
}

fn compose_recommendation(prediction: &RemotePrediction) -> String {
    let mut text = prediction.recommendation.trim().to_string();
    if !prediction.external_factors.is_empty() {
        text.push_str(&format!(
            " External factors: {}.",
            prediction.external_factors.join(", ")
        ));
    }
    if let Some(timing) = prediction.optimal_timing.as_deref().map(str::trim) {
        if !timing.is_empty() {
            text.push_str(&format!(" Optimal timing: {timing}."));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forecast::{Confidence, Trend};
    use crate::models::outcome::OutcomeRecord;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 18, 12, 0, 0).unwrap()
    }

    fn history(id: &str, applications: i64) -> VariantHistory {
        VariantHistory {
            variant_id: id.to_string(),
            variant_title: format!("Variant {id}"),
            records: (0..applications)
                .map(|i| OutcomeRecord {
                    variant_id: id.to_string(),
                    applied_at: now() - ChronoDuration::days(i * 7),
                    response_received: i % 2 == 0,
                    interview_granted: false,
                    company: Some("Acme".to_string()),
                    job_title: None,
                })
                .collect(),
        }
    }

    fn prediction(id: &str, predicted_interview: f64) -> RemotePrediction {
        RemotePrediction {
            variant_id: id.to_string(),
            variant_title: format!("Variant {id}"),
            current_response_rate: 20.0,
            predicted_response_rate: 30.0,
            current_interview_rate: 10.0,
            predicted_interview_rate: predicted_interview,
            confidence: Confidence::High,
            recommendation: "Use this one.".to_string(),
            external_factors: vec![],
            optimal_timing: None,
            data_points: None,
        }
    }

    struct Fixed {
        predictions: Vec<RemotePrediction>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteForecaster for Fixed {
        async fn predict(
            &self,
            _request: &RemoteForecastRequest,
        ) -> Result<Vec<RemotePrediction>, ForecastClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.predictions.clone())
        }
    }

    struct Slow;

    #[async_trait]
    impl RemoteForecaster for Slow {
        async fn predict(
            &self,
            _request: &RemoteForecastRequest,
        ) -> Result<Vec<RemotePrediction>, ForecastClientError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![])
        }
    }

    #[test]
    fn test_request_only_includes_eligible_variants() {
        let histories = vec![history("a", 3), history("b", 2)];
        let request = build_request(&histories, &ForecastPolicy::default());
        assert_eq!(request.variants.len(), 1);
        assert_eq!(request.variants[0].variant_id, "a");
        assert_eq!(request.variants[0].applications.len(), 3);
    }

    #[tokio::test]
    async fn test_not_configured() {
        let result = fetch_remote_forecasts(
            None,
            &[history("a", 5)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(RemoteUnavailable::NotConfigured)));
    }

    #[tokio::test]
    async fn test_no_eligible_variants_skips_call() {
        let remote = Fixed {
            predictions: vec![prediction("a", 20.0)],
            calls: AtomicUsize::new(0),
        };
        let result = fetch_remote_forecasts(
            Some(&remote),
            &[history("a", 2)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(RemoteUnavailable::NoEligibleVariants(3))));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_batched_call_in_history_order() {
        let remote = Fixed {
            predictions: vec![prediction("b", 15.0), prediction("a", 25.0)],
            calls: AtomicUsize::new(0),
        };
        let forecasts = fetch_remote_forecasts(
            Some(&remote),
            &[history("a", 4), history("b", 4)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        let ids: Vec<_> = forecasts.iter().map(|f| f.variant_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(forecasts.iter().all(|f| f.source == ForecastSource::Remote));
    }

    #[tokio::test]
    async fn test_only_unknown_variants_is_unavailable() {
        let remote = Fixed {
            predictions: vec![prediction("zzz", 15.0)],
            calls: AtomicUsize::new(0),
        };
        let result = fetch_remote_forecasts(
            Some(&remote),
            &[history("a", 4)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(RemoteUnavailable::NoUsablePredictions)));
    }

    #[tokio::test]
    async fn test_empty_predictions_is_unavailable() {
        let remote = Fixed {
            predictions: vec![],
            calls: AtomicUsize::new(0),
        };
        let result = fetch_remote_forecasts(
            Some(&remote),
            &[history("a", 4)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(
            result,
            Err(RemoteUnavailable::Client(ForecastClientError::EmptyPredictions))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_unavailable() {
        let result = fetch_remote_forecasts(
            Some(&Slow),
            &[history("a", 4)],
            now(),
            &ForecastPolicy::default(),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(RemoteUnavailable::Timeout(_))));
    }

    #[test]
    fn test_adapt_clamps_and_composes_recommendation() {
        let mut p = prediction("a", 140.0);
        p.predicted_response_rate = -10.0;
        p.external_factors = vec!["Hiring freeze".to_string(), "Q4 budgets".to_string()];
        p.optimal_timing = Some("Monday mornings".to_string());
        p.data_points = Some(9);

        let forecast = adapt_prediction(&p, &history("a", 4), now(), &ForecastPolicy::default());
        assert_eq!(forecast.predicted_interview_rate, 100.0);
        assert_eq!(forecast.predicted_response_rate, 0.0);
        assert_eq!(forecast.data_points, 9);
        assert_eq!(
            forecast.recommendation,
            "Use this one. External factors: Hiring freeze, Q4 budgets. Optimal timing: Monday mornings."
        );
    }

    #[test]
    fn test_adapt_chart_and_trend() {
        let forecast = adapt_prediction(
            &prediction("a", 20.0),
            &history("a", 4),
            now(),
            &ForecastPolicy::default(),
        );
        // response +10, interview +10 → average delta 10
        assert_eq!(forecast.trend, Trend::Improving);
        assert_eq!(forecast.data_points, 4);
        assert_eq!(forecast.chart.len(), 4 + 4);
        for point in &forecast.chart[..4] {
            assert!(!point.is_prediction);
            assert!(point.predicted_response.is_none());
        }
        for point in &forecast.chart[4..] {
            assert!(point.is_prediction);
            assert!(point.actual_response.is_none());
            assert_eq!(point.predicted_interview, Some(20.0));
        }
        assert_eq!(forecast.recommendation, "Use this one.");
    }
}
