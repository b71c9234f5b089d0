//! OpenSASE Forms API server

use anyhow::Context;
use forms_api::{build_router, ApiState, ServerConfig};
use forms_core::infrastructure::{InMemoryFormRepository, InMemorySubmissionStore, TracingAnalytics};
use forms_core::AnalyticsSink;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let analytics = Arc::new(TracingAnalytics::new());
    analytics.init().await.context("starting analytics")?;

    let state = ApiState::with_service(
        Arc::new(InMemoryFormRepository::new()),
        Arc::new(InMemorySubmissionStore::new()),
        analytics.clone(),
        &config.forms,
    );
    let app = build_router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("Forms API listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    analytics.shutdown().await.context("stopping analytics")?;
    tracing::info!("Forms API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
