//! Forecast Client — the single point of entry for calls to the learned
//! forecast service.
//!
//! No other module talks to the service directly. Callers go through the
//! `RemoteForecaster` seam in `forecasting::remote`, which owns fallback.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::forecast::Confidence;
use crate::models::outcome::OutcomeRecord;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Error)]
pub enum ForecastClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("forecast service returned no predictions")]
    EmptyPredictions,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RemoteForecastRequest {
    pub variants: Vec<RemoteVariantInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteVariantInput {
    pub variant_id: String,
    pub variant_title: String,
    pub applications: Vec<RemoteApplication>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteApplication {
    pub applied_at: DateTime<Utc>,
    pub response_received: bool,
    pub interview_granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl From<&OutcomeRecord> for RemoteApplication {
    fn from(record: &OutcomeRecord) -> Self {
        Self {
            applied_at: record.applied_at,
            response_received: record.response_received,
            interview_granted: record.interview_granted,
            company: record.company.clone(),
            job_title: record.job_title.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoteForecastResponse {
    #[serde(default)]
    pub predictions: Option<Vec<RemotePrediction>>,
}

/// One per-variant prediction as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePrediction {
    #[serde(rename = "variant_id")]
    pub variant_id: String,
    #[serde(rename = "variant_title")]
    pub variant_title: String,
    pub current_response_rate: f64,
    pub predicted_response_rate: f64,
    pub current_interview_rate: f64,
    pub predicted_interview_rate: f64,
    pub confidence: Confidence,
    pub recommendation: String,
    #[serde(default)]
    pub external_factors: Vec<String>,
    #[serde(default)]
    pub optimal_timing: Option<String>,
    #[serde(default)]
    pub data_points: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ForecastClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ForecastClient {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ForecastClientError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one batched request. No retries: a failure here means the caller
    /// falls back to local forecasting for the whole request.
    pub async fn predict(
        &self,
        request: &RemoteForecastRequest,
    ) -> Result<Vec<RemotePrediction>, ForecastClientError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ForecastClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let predictions = parse_predictions(&body)?;
        debug!(
            "Forecast service returned {} predictions for {} variants",
            predictions.len(),
            request.variants.len()
        );
        Ok(predictions)
    }
}

/// Parses a response body. A missing or empty `predictions` field is an error.
pub fn parse_predictions(body: &str) -> Result<Vec<RemotePrediction>, ForecastClientError> {
    let parsed: RemoteForecastResponse = serde_json::from_str(body)?;
    match parsed.predictions {
        Some(predictions) if !predictions.is_empty() => Ok(predictions),
        _ => Err(ForecastClientError::EmptyPredictions),
    }
}
