use anyhow::Context;
use axum::{extract::Extension, routing::get, Router};
use std::sync::Arc;

use crate::api::chat::{handle_chat, handle_health};
use crate::config::Config;
use crate::rag::RagService;

pub async fn run(config: &Config, service: Arc<RagService>) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/chat", get(handle_chat))
        .route("/health", get(handle_health))
        .layer(Extension(service));

    let bind_addr = format!("{}:{}", config.address, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("ragserve listening on {bind_addr} with routes:");
    tracing::info!("  GET /chat");
    tracing::info!("  GET /health");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("ragserve stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => tracing::error!("failed to listen for shutdown signal: {e}"),
    }
}
