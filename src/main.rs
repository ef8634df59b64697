//! Clickstream beacon collector (v1)
//!
//! Terminates tracking-pixel requests, assigns party and session cookies and
//! hands every accepted hit to the processing pool, keyed by party.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────────┐
//!                        │                  BEACON COLLECTOR                    │
//!                        │                                                      │
//!     GET /csc-event     │  ┌─────────┐   ┌──────────┐   ┌────────────────┐     │
//!     ───────────────────┼─▶│  http   │──▶│ request  │──▶│   tracking     │     │
//!                        │  │ server  │   │   gate   │   │ party/session  │     │
//!                        │  └─────────┘   └────┬─────┘   └───────┬────────┘     │
//!                        │                     │ 405             │              │
//!     202 + pixel        │  ┌──────────┐       │                 ▼              │
//!     ◀──────────────────┼──│ response │◀──────┴─────────  Set-Cookie x2        │
//!                        │  │ composer │                         │              │
//!                        │  └──────────┘                         ▼              │
//!                        │                               ┌────────────────┐     │
//!                        │                               │   dispatch     │     │
//!                        │                               │ hash(party) →  │     │
//!                        │                               │ partition queue│     │
//!                        │                               └────────────────┘     │
//!                        │  ┌────────────────────────────────────────────────┐  │
//!                        │  │ config · observability · lifecycle · net/tls   │  │
//!                        │  └────────────────────────────────────────────────┘  │
//!                        └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use beacon_collector::config::{load_config, CollectorConfig};
use beacon_collector::lifecycle::startup;
use beacon_collector::observability::logging;

#[derive(Parser)]
#[command(name = "beacon-collector")]
#[command(about = "Clickstream beacon collector", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration and startup resources, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CollectorConfig::default(),
    };

    logging::init_logging(&config.observability);

    if cli.check {
        startup::preflight(&config)?;
        tracing::info!("Configuration OK");
        return Ok(());
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        "beacon-collector starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
