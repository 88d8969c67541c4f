use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

/// Which pipeline produced a forecast. Kept for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    Remote,
    Local,
}

/// One calendar week of outcomes for a single variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    /// ISO year-week label, e.g. `2026-W07`. Sorts the same way as `week_start`.
    pub week_key: String,
    /// Monday of the ISO week.
    pub week_start: NaiveDate,
    pub total: u32,
    pub responses: u32,
    pub interviews: u32,
    pub response_rate: f64,  // 0 – 100
    pub interview_rate: f64, // 0 – 100
}

/// A single plotted point. Historical points carry only `actual_*` values,
/// forecast points only `predicted_*` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub week_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_response: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_interview: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_response: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_interview: Option<f64>,
    pub is_prediction: bool,
}

impl ForecastPoint {
    pub fn actual(week_label: String, response: f64, interview: f64) -> Self {
        Self {
            week_label,
            actual_response: Some(response),
            actual_interview: Some(interview),
            predicted_response: None,
            predicted_interview: None,
            is_prediction: false,
        }
    }

    pub fn predicted(week_label: String, response: f64, interview: f64) -> Self {
        Self {
            week_label,
            actual_response: None,
            actual_interview: None,
            predicted_response: Some(response),
            predicted_interview: Some(interview),
            is_prediction: true,
        }
    }
}

/// Forecast for one resume variant, in the shape the dashboard plots directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantForecast {
    pub variant_id: String,
    pub variant_title: String,
    pub current_response_rate: f64,
    pub current_interview_rate: f64,
    pub predicted_response_rate: f64,
    pub predicted_interview_rate: f64,
    pub confidence: Confidence,
    pub trend: Trend,
    pub recommendation: String,
    pub data_points: usize,
    pub chart: Vec<ForecastPoint>,
    #[serde(skip)]
    pub source: ForecastSource,
}
