//! Demo server for request-scoped logging.
//!
//! ```text
//! request ──▶ context middleware ──▶ handler ──▶ tracing events
//!               │ x-trace-id / x-request-id        │
//!               ▼                                  ▼
//!          context scope ─────────────────▶ ContextFormat ──▶ stdout
//!                                       (rate limit gate)
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use log_context::config::load_config;
use log_context::http::{build_router, server};
use log_context::lifecycle::{signals, Shutdown};
use log_context::observability::{init_logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "log-context", version, about = "Request-scoped logging demo server")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut config, warnings) = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    init_logging(&config)?;
    for warning in &warnings {
        tracing::warn!(%warning, "Configuration adjusted");
    }

    if config.metrics.enabled {
        metrics::init_metrics(config.metrics.address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        trigger.trigger();
    });

    server::run(build_router(&config), listener, server_shutdown).await?;

    if !shutdown.is_triggered() {
        tracing::warn!("Server stopped without a shutdown signal");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
