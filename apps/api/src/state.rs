use std::sync::Arc;

use crate::forecasting::history::HistorySource;
use crate::forecasting::service::ForecastEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable history source. Default: PgHistorySource.
    pub history: Arc<dyn HistorySource>,
    /// Forecasting engine; holds the optional remote forecaster and the policy.
    pub engine: ForecastEngine,
}
