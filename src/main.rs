use std::sync::Arc;

use anyhow::Context;
use tokio::signal::unix::{signal, SignalKind};
use tracing_subscriber::EnvFilter;

use desemprego_zero::app::{app, cors_layer, AppState};
use desemprego_zero::auth::TokenIssuer;
use desemprego_zero::config::AppConfig;
use desemprego_zero::database::{manager, schema, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting in {:?} mode", config.environment);

    let pool = manager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    schema::ensure_schema(&pool)
        .await
        .context("failed to prepare database schema")?;

    let tokens = TokenIssuer::from_config(&config.security).context("invalid JWT settings")?;
    let state = AppState::new(Arc::new(PgStore::new(pool)), Arc::new(tokens))?;
    let router = app(state, cors_layer(&config));

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal()?)
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on SIGTERM or SIGINT so in-flight requests can drain.
fn shutdown_signal() -> anyhow::Result<impl std::future::Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    })
}
