//! autoviz server entry point.
//!
//! Loads configuration, wires the extraction pipeline and the image-generation
//! client into an axum router, and serves HTTP until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::Result;
use autoviz_client::{GenerationClient, GenerationConfig, ProductPipeline, Visualizer};
use autoviz_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod routes;

use crate::app::{AppState, build_app};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load()?;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).json().init();

    if config.require_openai_api_key().is_err() {
        tracing::warn!("AUTOVIZ_OPENAI_API_KEY is not set; /generate-visualization will fail");
    }

    let generation = GenerationClient::new(GenerationConfig::from_app_config(&config))?;
    let state = AppState {
        pipeline: Arc::new(ProductPipeline::from_app_config(&config)?),
        visualizer: Arc::new(Visualizer::from_app_config(Arc::new(generation), &config)),
    };
    let app = build_app(state, &config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, taxonomy = ?config.taxonomy, "autoviz server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
