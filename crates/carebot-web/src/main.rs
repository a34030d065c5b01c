//! carebot-web — Axum web server entry point.
//! Loads config, builds the text generator once, serves the chat page.

mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use carebot_core::config::Config;
use carebot_core::generator::HttpGenerator;

use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load_or_default(&project_root.join("config.yaml"))?;

    // Load the model once; the page keeps working on keywords if this fails
    let (generator, load_error) = match HttpGenerator::new(&config) {
        Ok(generator) => (Some(generator), None),
        Err(e) => {
            error!("Error loading the chatbot model: {}", e);
            (None, Some(e.to_string()))
        }
    };

    let state = Arc::new(AppState::new(config, generator, load_error)?);
    let app = server::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = format!("0.0.0.0:{}", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    eprintln!("\n  Healthcare assistant running at http://localhost:{}\n", port);

    // Graceful shutdown on Ctrl+C
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")?;

    info!("Server stopped.");
    Ok(())
}
