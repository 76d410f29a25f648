use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use granteval_core::EvaluationEngine;

use crate::api;

pub async fn handle_serve_command(engine: Arc<EvaluationEngine>, host: &str, port: u16) -> Result<()> {
    let capable = engine.gate().check().is_capable();
    let router = api::create_router(engine);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    info!(addr = %addr, backend = capable, "API server listening");

    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Listening on http://{}", addr).bold()
    );
    if !capable {
        eprintln!(
            "  {} No API credential configured; serving default analyses",
            "!".yellow()
        );
    }
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed.
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
