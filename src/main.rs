//! Hshield forwarding proxy.
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────┐
//!     ───────────────────────▶│  /proxy/*path                        │
//!                             │    method allow-list                 │
//!                             │    Authorization + Content-Type only │──────▶ Backend API
//!                             │    30s deadline, single attempt      │
//!     ◀───────────────────────│    JSON always                       │◀────── (any body)
//!                             └──────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use hshield_proxy::config;
use hshield_proxy::lifecycle::{signals, Shutdown};
use hshield_proxy::observability::{logging, metrics};
use hshield_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "hshield-proxy")]
#[command(about = "Same-origin forwarding proxy for the Hshield dashboard", long_about = None)]
struct Args {
    /// Path to a TOML config file. Environment overrides still apply.
    #[arg(short, long, env = "HSHIELD_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = config::resolve(args.config.as_deref())?;

    logging::init(&config.observability);

    tracing::info!("hshield-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.base_url,
        environment = ?config.environment,
        request_timeout_ms = config.timeouts.request_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::forward_to(&signal_shutdown).await;
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
