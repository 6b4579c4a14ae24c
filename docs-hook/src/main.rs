//! docs-hook server.
//!
//! On startup this binary:
//! - Loads configuration from the environment
//! - Clones or updates the documentation checkout
//! - Runs an initial site build
//! - Serves `POST /api/docs` until SIGINT/SIGTERM

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dochook::{router, AppState, Config, Generator, LocalBuildTrigger, Repository, VerifierConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("docs_hook_starting");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        git_url = %config.git_url,
        repo_name = %config.repo_name,
        tool_type = %config.tool_type,
        secret_configured = config.secret_configured(),
        output = %config.output_dir.display(),
        port = config.port,
        "config_loaded"
    );

    let repository = Repository::new(
        config.git_url.clone(),
        config.repo_dir(),
        config.command_timeout,
    );
    repository
        .check_client()
        .await
        .context("git is not available")?;
    repository
        .ensure_checkout()
        .await
        .context("Failed to initialize repository")?;

    let generator = Generator::new(
        config.tool_type,
        config.repo_dir(),
        config.output_dir.clone(),
        config.command_timeout,
    );
    generator
        .build()
        .await
        .with_context(|| format!("Failed to initialize {} document", config.tool_type))?;
    info!(tool_type = %config.tool_type, "document_initialized");

    let verifier_config = VerifierConfig::new(config.secret_key.clone(), config.repo_name.clone());
    let trigger = Arc::new(LocalBuildTrigger::new(repository, generator));
    let app = router(AppState::new(verifier_config, trigger));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(address = %addr, "web_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("docs_hook_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("docs_hook_shutting_down");
}
