mod config;
mod db;
mod errors;
mod forecast_client;
mod forecasting;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::forecast_client::ForecastClient;
use crate::forecasting::history::PgHistorySource;
use crate::forecasting::remote::RemoteForecaster;
use crate::forecasting::service::ForecastEngine;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume forecast API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let history = Arc::new(PgHistorySource::new(
        db,
        config.policy.min_remote_applications,
    ));

    // Initialize remote forecast client (optional)
    let remote: Option<Arc<dyn RemoteForecaster>> = match &config.forecast_service_url {
        Some(url) => {
            let client = ForecastClient::new(
                url.clone(),
                config.forecast_service_api_key.clone(),
                config.forecast_timeout,
            )?;
            info!(
                "Remote forecast client initialized ({}, timeout {:?})",
                client.endpoint(),
                config.forecast_timeout
            );
            Some(Arc::new(client))
        }
        None => {
            info!("FORECAST_SERVICE_URL not set; forecasts will be computed locally");
            None
        }
    };

    info!("Forecast policy: {:?}", config.policy);
    let engine = ForecastEngine::new(remote, config.policy.clone(), config.forecast_timeout);

    // Build app state
    let state = AppState { history, engine };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the dashboard host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
