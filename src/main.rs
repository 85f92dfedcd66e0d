//! RAPID AI - condition-monitoring decision engine
//!
//! # Usage
//!
//! ```bash
//! # Serve the HTTP API (default subcommand)
//! cargo run --release -- serve --addr 0.0.0.0:8000
//!
//! # Run the full pipeline once on a JSON request
//! ./rapid-ai evaluate --input request.json
//!
//! # Load, validate and print the effective configuration
//! ./rapid-ai --config rapid_ai.toml check-config
//! ```
//!
//! # Environment Variables
//!
//! - `RAPID_AI_CONFIG`: Path to the TOML configuration
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use rapid_ai::api::{create_app, AppState};
use rapid_ai::config::{self, EngineConfig};
use rapid_ai::types::FullAnalysisRequest;
use rapid_ai::PipelineOrchestrator;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "rapid-ai")]
#[command(about = "RAPID AI condition-monitoring decision engine")]
#[command(version)]
struct CliArgs {
    /// Path to the TOML configuration (fails hard on a bad file)
    #[arg(long, global = true, env = "RAPID_AI_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Override `server.addr`
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Run the full pipeline on a JSON request and print the JSON response
    Evaluate {
        /// Path to a FullAnalysisRequest JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Load and validate configuration, then print it as TOML
    CheckConfig,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(p) => {
            let config = EngineConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config from {}", p.display()))?;
            info!(path = %p.display(), profiles = config.profiles.len(), "Loaded engine config");
            Ok(config)
        }
        None => EngineConfig::load().context("Failed to load engine config"),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

async fn serve(addr: Option<String>) -> Result<()> {
    let settings = config::get();
    let server_addr = addr.unwrap_or_else(|| settings.server.addr.clone());

    let app = create_app(AppState::from_global(), &settings.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;

    info!(
        addr = %server_addr,
        workers = settings.pipeline.worker_threads,
        "HTTP server listening"
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

async fn evaluate(input: PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let request: FullAnalysisRequest = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid pipeline request in {}", input.display()))?;

    let response = PipelineOrchestrator::from_global().evaluate(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn check_config() -> Result<()> {
    let settings = config::get();
    settings.validate()?;
    print!("{}", settings.to_toml()?);
    info!("Configuration is valid");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_json);

    config::init(load_config(args.config.as_ref())?);

    match args.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => serve(addr).await,
        Command::Evaluate { input } => evaluate(input).await,
        Command::CheckConfig => check_config(),
    }
}
