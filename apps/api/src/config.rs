use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::forecast_client::DEFAULT_TIMEOUT;
use crate::forecasting::policy::ForecastPolicy;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Learned forecast service endpoint. Unset disables remote forecasting.
    pub forecast_service_url: Option<String>,
    pub forecast_service_api_key: Option<String>,
    pub forecast_timeout: Duration,
    pub policy: ForecastPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            forecast_service_url: optional_env("FORECAST_SERVICE_URL"),
            forecast_service_api_key: optional_env("FORECAST_SERVICE_API_KEY"),
            forecast_timeout: Duration::from_millis(parse_env(
                "FORECAST_TIMEOUT_MS",
                DEFAULT_TIMEOUT.as_millis() as u64,
            )?),
            policy: policy_from_env()?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Ten years of weekly history.
const MAX_LOOKBACK_WEEKS: u32 = 520;

/// Reads `FORECAST_*` overrides on top of `ForecastPolicy::default()`.
pub fn policy_from_env() -> Result<ForecastPolicy> {
    let defaults = ForecastPolicy::default();
    let policy = ForecastPolicy {
        lookback_weeks: parse_env("FORECAST_LOOKBACK_WEEKS", defaults.lookback_weeks)?,
        min_weeks: parse_env("FORECAST_MIN_WEEKS", defaults.min_weeks)?,
        min_remote_applications: parse_env(
            "FORECAST_MIN_REMOTE_APPLICATIONS",
            defaults.min_remote_applications,
        )?,
        high_variance_ceiling: parse_env("FORECAST_HIGH_VARIANCE", defaults.high_variance_ceiling)?,
        medium_variance_ceiling: parse_env(
            "FORECAST_MEDIUM_VARIANCE",
            defaults.medium_variance_ceiling,
        )?,
        high_min_points: parse_env("FORECAST_HIGH_MIN_POINTS", defaults.high_min_points)?,
        medium_min_points: parse_env("FORECAST_MEDIUM_MIN_POINTS", defaults.medium_min_points)?,
        trend_slope_threshold: parse_env("FORECAST_TREND_SLOPE", defaults.trend_slope_threshold)?,
        rate_delta_threshold: parse_env("FORECAST_RATE_DELTA", defaults.rate_delta_threshold)?,
        low_interview_rate: parse_env(
            "FORECAST_LOW_INTERVIEW_RATE",
            defaults.low_interview_rate,
        )?,
        horizon_weeks: parse_env("FORECAST_HORIZON_WEEKS", defaults.horizon_weeks)?,
    };

    ensure!(
        policy.min_weeks >= 2,
        "FORECAST_MIN_WEEKS must be at least 2 to fit a trend"
    );
    ensure!(
        (1..=MAX_LOOKBACK_WEEKS).contains(&policy.lookback_weeks),
        "FORECAST_LOOKBACK_WEEKS must be between 1 and {MAX_LOOKBACK_WEEKS}"
    );
    Ok(policy)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
