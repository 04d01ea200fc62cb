//! TaskFlow API server entry point

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskflow_server::{config::ServerConfig, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskflow_server=debug,taskflow_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?;

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!("REST API listening on {}", config.bind);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
