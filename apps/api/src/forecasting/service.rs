//! Forecasting request orchestration.
//!
//! Flow: remote adapter (one batched call) → on any failure, local pipeline for
//!       every variant → best-variant selection.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::forecasting::assembler::forecast_variant;
use crate::forecasting::policy::ForecastPolicy;
use crate::forecasting::remote::{fetch_remote_forecasts, RemoteForecaster, RemoteUnavailable};
use crate::forecasting::selector::select_best_variant;
use crate::models::forecast::{ForecastSource, VariantForecast};
use crate::models::outcome::VariantHistory;

/// Result of one forecasting request.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub source: ForecastSource,
    pub forecasts: Vec<VariantForecast>,
    pub best_variant_id: Option<String>,
}

#[derive(Clone)]
pub struct ForecastEngine {
    remote: Option<Arc<dyn RemoteForecaster>>,
    policy: ForecastPolicy,
    remote_timeout: Duration,
}

impl ForecastEngine {
    pub fn new(
        remote: Option<Arc<dyn RemoteForecaster>>,
        policy: ForecastPolicy,
        remote_timeout: Duration,
    ) -> Self {
        Self {
            remote,
            policy,
            remote_timeout,
        }
    }

    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Forecasts every variant. Never fails: an unavailable remote service
    /// degrades to local forecasts, and variants without enough history are
    /// left out.
    pub async fn forecast(&self, histories: &[VariantHistory], now: DateTime<Utc>) -> ForecastReport {
        let (source, forecasts) = match fetch_remote_forecasts(
            self.remote.as_deref(),
            histories,
            now,
            &self.policy,
            self.remote_timeout,
        )
        .await
        {
            Ok(forecasts) => (ForecastSource::Remote, forecasts),
            Err(reason) => {
                match &reason {
                    RemoteUnavailable::NotConfigured | RemoteUnavailable::NoEligibleVariants(_) => {
                        info!("Using local forecasts: {reason}")
                    }
                    _ => warn!("Remote forecasting unavailable, falling back to local: {reason}"),
                }
                (ForecastSource::Local, self.forecast_locally(histories, now))
            }
        };

        let best_variant_id = select_best_variant(&forecasts).map(|f| f.variant_id.clone());
        info!(
            "Forecast {} of {} variants ({:?}), best: {:?}",
            forecasts.len(),
            histories.len(),
            source,
            best_variant_id
        );

        ForecastReport {
            source,
            forecasts,
            best_variant_id,
        }
    }

    /// Runs the local pipeline for every variant, in input order.
    pub fn forecast_locally(
        &self,
        histories: &[VariantHistory],
        now: DateTime<Utc>,
    ) -> Vec<VariantForecast> {
        histories
            .iter()
            .filter_map(|history| forecast_variant(history, now, &self.policy))
            .collect()
    }
}
