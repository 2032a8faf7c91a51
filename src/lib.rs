use anyhow::Context;
use axum::serve;
use config::Config;
use routes::init_router;
use state::AppState;
use tokio::net::TcpListener;

pub mod config;
pub mod controllers;
pub mod db;
pub mod error;
pub mod middlewares;
pub mod model;
pub mod query;
pub mod routes;
pub mod services;
pub mod state;
pub mod statistics;
pub mod telemetry;
pub mod util;

pub async fn run() -> Result<(), anyhow::Error> {
    let config = Config::new().context("Failed to read configuration.")?;
    let address = config.application.get_address();
    let state = AppState::init(config)
        .await
        .context("Failed to initialise application state.")?;
    let router = init_router(state);

    tracing::info!("Starting server: {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Unable to bind {}", address))?;
    serve(listener, router.into_make_service()).await?;

    Ok(())
}
