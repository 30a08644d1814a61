//! Main entry point for the Paddle Room service
//!
//! Loads configuration, installs logging and serves the REST API until a
//! shutdown signal arrives.

use anyhow::{anyhow, Result};
use clap::Parser;
use paddle_room::api::ApiServer;
use paddle_room::config::{validate_config, AppConfig};
use paddle_room::service::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Paddle Room - player tracking with simulated table-tennis matches
#[derive(Parser)]
#[command(
    name = "paddle-room",
    version,
    about = "A player tracking service with simulated table-tennis matches",
    long_about = "Paddle Room stores players and their win/loss records, simulates matches \
                 between two stored players and updates their statistics, behind a small \
                 REST API with token sign-in."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Log format override
    #[arg(long, value_name = "FORMAT", help = "Override log format (text, json)")]
    log_format: Option<String>,

    /// HTTP port override
    #[arg(long, value_name = "PORT", help = "Override HTTP server port")]
    http_port: Option<u16>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level and format
fn init_logging(log_level: &str, log_format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log_level.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true);

    let result = if log_format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("Paddle Room");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Log format: {}", config.service.log_format);
    info!(
        "   HTTP: {}:{}",
        config.service.http_host, config.service.http_port
    );
    info!(
        "   Storage timeout: {}ms",
        config.storage.operation_timeout_ms
    );
    match config.game.referee_seed {
        Some(seed) => info!("   Referee seed: {}", seed),
        None => info!("   Referee seed: entropy"),
    }
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(config_path) => AppConfig::from_file(config_path)?,
        None => AppConfig::from_env()?,
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }
    if let Some(log_format) = &args.log_format {
        config.service.log_format = log_format.clone();
    }
    if args.debug {
        config.service.log_level = "debug".to_string();
    }
    if let Some(http_port) = args.http_port {
        config.service.http_port = http_port;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).map_err(|e| anyhow!("Configuration error: {:#}", e))?;

    // Initialize logging early (before any other operations)
    init_logging(&config.service.log_level, &config.service.log_format)?;
    if let Some(config_path) = &args.config {
        info!("Loaded configuration from: {}", config_path.display());
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let app_state = Arc::new(AppState::new(config.clone()).inspect_err(|e| {
        error!("Failed to initialize application: {:#}", e);
    })?);
    app_state.start().await;

    let server = Arc::new(ApiServer::new(app_state.clone()));
    let mut server_task = {
        let server = server.clone();
        tokio::spawn(async move { server.serve().await })
    };

    info!("Paddle Room is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("Shutdown signal received, beginning graceful shutdown...");
        }
        finished = &mut server_task => {
            // The server only returns early when it fails to start
            app_state.stop().await;
            return match finished {
                Ok(result) => result,
                Err(e) => Err(anyhow!("HTTP server task failed: {}", e)),
            };
        }
    }

    app_state.stop().await;
    server.stop();

    match tokio::time::timeout(config.shutdown_timeout(), server_task).await {
        Ok(Ok(Ok(()))) => info!("Graceful shutdown completed successfully"),
        Ok(Ok(Err(e))) => error!("HTTP server stopped with error: {:#}", e),
        Ok(Err(e)) => error!("HTTP server task failed: {}", e),
        Err(_) => warn!("Shutdown timeout exceeded, forcing exit"),
    }

    info!("Paddle Room stopped");
    Ok(())
}
