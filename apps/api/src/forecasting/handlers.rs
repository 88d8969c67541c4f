//! Axum route handlers for the Forecasting API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::forecasting::aggregator::aggregate_weekly;
use crate::models::forecast::{ForecastSource, VariantForecast, WeeklyBucket};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Reference time; defaults to the wall clock.
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ResumeForecastResponse {
    pub profile_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: ForecastSource,
    pub forecasts: Vec<VariantForecast>,
    pub best_variant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeeklyBreakdownResponse {
    pub profile_id: Uuid,
    pub variant_id: String,
    pub variant_title: String,
    pub lookback_weeks: u32,
    pub buckets: Vec<WeeklyBucket>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profiles/:profile_id/resume-forecasts
///
/// Forecasts every resume variant of the profile and names the best one.
/// Only a history-source failure turns into an error response.
pub async fn handle_resume_forecasts(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ResumeForecastResponse>, AppError> {
    let now = query.now.unwrap_or_else(Utc::now);
    let histories = state.history.variant_histories(profile_id).await?;
    let report = state.engine.forecast(&histories, now).await;

    Ok(Json(ResumeForecastResponse {
        profile_id,
        generated_at: now,
        source: report.source,
        forecasts: report.forecasts,
        best_variant_id: report.best_variant_id,
    }))
}

/// GET /api/v1/profiles/:profile_id/resume-variants/:variant_id/weekly
///
/// Returns the weekly buckets the local pipeline works from for one variant.
/// Variants with too few applications to forecast are still listed.
pub async fn handle_variant_weekly(
    State(state): State<AppState>,
    Path((profile_id, variant_id)): Path<(Uuid, String)>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<WeeklyBreakdownResponse>, AppError> {
    let now = query.now.unwrap_or_else(Utc::now);
    let history = state
        .history
        .variant_history(profile_id, &variant_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No application history for resume variant {variant_id}"
            ))
        })?;

    let lookback_weeks = state.engine.policy().lookback_weeks;
    let buckets = aggregate_weekly(&history.records, now, lookback_weeks);

    Ok(Json(WeeklyBreakdownResponse {
        profile_id,
        variant_id: history.variant_id,
        variant_title: history.variant_title,
        lookback_weeks,
        buckets,
    }))
}
