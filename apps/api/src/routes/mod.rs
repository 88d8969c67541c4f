pub mod health;

use axum::{routing::get, Router};

use crate::forecasting::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Forecasting API
        .route(
            "/api/v1/profiles/:profile_id/resume-forecasts",
            get(handlers::handle_resume_forecasts),
        )
        .route(
            "/api/v1/profiles/:profile_id/resume-variants/:variant_id/weekly",
            get(handlers::handle_variant_weekly),
        )
        .with_state(state)
}
