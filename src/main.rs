//! Rewriting reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                   REWRITE PROXY                      │
//!                     │                                                      │
//!   Client Request    │  ┌─────────┐    ┌──────────────┐   static prefix?    │
//!   ──────────────────┼─▶│  http   │───▶│   routing    │──── yes ──▶ ServeDir│
//!                     │  │ server  │    │  dispatcher  │                     │
//!                     │  └─────────┘    └──────┬───────┘                     │
//!                     │                        │ no                          │
//!                     │                        ▼                             │
//!                     │  ┌──────────┐   ┌──────────────┐   ┌──────────────┐  │
//!                     │  │ director │──▶│  transport   │──▶│   rewrite    │  │
//!                     │  │host:=up  │   │ (hyper-util) │   │ body + length│  │
//!                     │  └──────────┘   └──────────────┘   └──────┬───────┘  │
//!   Client Response   │                                           │          │
//!   ◀─────────────────┼───────────────────────────────────────────┘          │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rewrite_proxy::config::load_config;
use rewrite_proxy::lifecycle::{signals, startup, Shutdown};
use rewrite_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "rewrite-proxy")]
#[command(about = "Reverse proxy that rewrites upstream response bodies and serves static files", long_about = None)]
struct Cli {
    /// Path to the JSON or TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    tracing::info!("rewrite-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&cli.config).map_err(startup::StartupError::from)?;

    tracing::info!(
        path = %cli.config.display(),
        proxy_host = %config.proxy_host,
        listen = %config.listen_address(),
        rules = config.regex_find_replace.len(),
        "Configuration loaded"
    );

    let (server, listener) = startup::start(&config).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
