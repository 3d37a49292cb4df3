//! Main entry point for the taxi fleet backend.
//!
//! This file loads configuration, initializes logging and the database pool,
//! and serves the Axum application until interrupted.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use taxi_backend::config::{LogFormat, Settings};
use taxi_backend::{app, database, AppState};

#[derive(Parser)]
#[command(name = "taxi-backend")]
#[command(about = "Taxi fleet management service", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(settings: &Settings, verbose: u8) {
    let level = match verbose {
        0 => settings.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("taxi_backend={level},tower_http={level},sqlx=warn").into()
    });

    match settings.logging.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_logging(&settings, cli.verbose);

    info!("Starting taxi-backend v{}", env!("CARGO_PKG_VERSION"));

    let pool = database::connect(&settings.database)
        .await
        .context("Failed to open database")?;

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let app = app(AppState::new(pool, settings));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
