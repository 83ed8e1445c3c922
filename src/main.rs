use anyhow::{Context, Result};
use axum::serve;
use registration_service::core::config::Config;
use registration_service::core::routes::build_app;
use registration_service::core::startup::init_store;
use registration_service::core::state::AppState;
use registration_service::core::tracing_init::init_tracing;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // An explicit path must exist; the default one may be absent
    let (config_path, required) = if args.len() > 1 {
        (PathBuf::from(&args[1]), true)
    } else {
        (PathBuf::from("config.toml"), false)
    };

    // Load and validate configuration
    let config = Config::load(&config_path, required)
        .context(format!(
            "Failed to load configuration from '{}'. \
            Copy config.example.toml to config.toml and adjust the values, or run without arguments to use defaults.",
            config_path.display()
        ))?;

    // Initialize tracing/logging
    init_tracing(&config.logging);

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Run the async main function
    let result = runtime.block_on(async_main(config, config_path));

    if let Err(e) = &result {
        error!(error = ?e, "Registration service exiting with error");
    }

    result
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        host = %config.server.host,
        port = config.server.port,
        num_threads = config.server.num_threads,
        storage_mode = ?config.storage.mode,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "Registration service starting"
    );

    // Connect and prepare storage; no listener is bound if this fails
    let store = init_store(&config.storage).await?;

    match store.count().await {
        Ok(registrations) => info!(backend = store.backend(), registrations, "Storage ready"),
        Err(e) => warn!(backend = store.backend(), error = %e, "Storage ready, but counting registrations failed"),
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, store));
    let app = build_app(state);

    info!(address = %addr, "Starting TCP listener");

    let listener = TcpListener::bind(&addr).await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "Registration service startup complete");

    serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
