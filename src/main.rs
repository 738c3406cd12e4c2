//! Proxy subscription rewriter.
//!
//! Fetches a Clash-style subscription, applies a fixed set of edits and
//! hands the rewritten document back to the caller.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /subscription
//!     ─────────────────▶ http::server ──▶ pipeline::controller
//!                                              │
//!                        ┌─────────────────────┼──────────────────────┐
//!                        ▼                     ▼                      ▼
//!                  fetch::client        editor::{dns,groups,   document + codec
//!                  (subscription,        rules,nodes}          (YAML / base64)
//!                   remote rules)
//!
//!     Cross-cutting: config (TOML + hot reload), observability
//!     (tracing, Prometheus), lifecycle (signals, graceful shutdown)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use subscription_rewriter::config::{load_config, watcher::ConfigWatcher, RewriterConfig};
use subscription_rewriter::lifecycle::signals::wait_for_signal;
use subscription_rewriter::observability::{logging, metrics};
use subscription_rewriter::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "subscription-rewriter")]
#[command(about = "Rewrites proxy subscriptions on request", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RewriterConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("subscription-rewriter v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        dns_to_remove = %config.edits.dns_to_remove,
        rules_url = %config.edits.rules_url,
        request_timeout_secs = config.timeouts.request_secs,
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

    // Hot reload only when a file backs the config.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (updates, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
