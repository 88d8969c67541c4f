use serde::{Deserialize, Serialize};

/// Tunable thresholds for the local forecasting pipeline.
///
/// The defaults reproduce the dashboard's observed behaviour. They are policy
/// choices rather than statistically derived values, so every one of them can
/// be overridden from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPolicy {
    /// Calendar weeks of history, counted back from "now", fed to the aggregator.
    pub lookback_weeks: u32,
    /// Populated weekly buckets required before a local forecast is produced.
    pub min_weeks: usize,
    /// Raw applications a variant needs before it is sent to the remote service.
    pub min_remote_applications: usize,
    /// Average series variance below which confidence may be `high`.
    pub high_variance_ceiling: f64,
    /// Average series variance below which confidence may be `medium`.
    pub medium_variance_ceiling: f64,
    pub high_min_points: usize,
    pub medium_min_points: usize,
    /// Average weekly slope (percentage points) separating improving/declining from stable.
    pub trend_slope_threshold: f64,
    /// Predicted-vs-current interview rate gap that counts as a meaningful change.
    pub rate_delta_threshold: f64,
    /// Predicted interview rate under which a declining variant is flagged.
    pub low_interview_rate: f64,
    /// Number of future weeks emitted in the chart series.
    pub horizon_weeks: usize,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            lookback_weeks: 12,
            min_weeks: 3,
            min_remote_applications: 3,
            high_variance_ceiling: 100.0,
            medium_variance_ceiling: 200.0,
            high_min_points: 8,
            medium_min_points: 5,
            trend_slope_threshold: 2.0,
            rate_delta_threshold: 5.0,
            low_interview_rate: 10.0,
            horizon_weeks: 4,
        }
    }
}
