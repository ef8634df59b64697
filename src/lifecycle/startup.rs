//! Startup orchestration.
//!
//! # Responsibilities
//! - Load every startup-time resource (pixel, TLS material)
//! - Initialize subsystems in dependency order
//! - Bind listeners and begin accepting traffic
//! - Drain the processing pool after the server stops
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;

use crate::config::CollectorConfig;
use crate::dispatch::{LoggingProcessor, PartitionedPool};
use crate::http::{HttpServer, Pixel, PixelError};
use crate::lifecycle::{signals, Shutdown};
use crate::net::listener::{self, ListenerError};
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

/// Errors that stop the collector from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("pixel: {0}")]
    Pixel(#[from] PixelError),

    #[error("metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("listener: {0}")]
    Listener(#[from] ListenerError),

    #[error("TLS: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load resources that must exist before serving.
pub fn preflight(config: &CollectorConfig) -> Result<Pixel, StartupError> {
    let pixel = Pixel::from_config(config.tracking.pixel_path.as_deref())?;
    tracing::info!(bytes = pixel.len(), "Response pixel loaded");
    Ok(pixel)
}

/// Run the collector until a shutdown signal arrives.
pub async fn run(config: CollectorConfig) -> Result<(), StartupError> {
    let pixel = preflight(&config)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    tracing::info!(
        party_cookie = %config.tracking.party_cookie,
        party_timeout_secs = config.tracking.party_timeout_secs,
        session_cookie = %config.tracking.session_cookie,
        session_timeout_secs = config.tracking.session_timeout_secs,
        "Tracking configured"
    );

    let listener = listener::bind(&config.listener).await?;
    let tls = match &config.listener.tls {
        Some(tls) => Some(load_tls_config(tls).await.map_err(StartupError::Tls)?),
        None => None,
    };

    let (pool, workers) = PartitionedPool::start(&config.processing, Arc::new(LoggingProcessor));

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        trigger.trigger();
    });

    let drain_timeout = Duration::from_secs(config.timeouts.shutdown_secs);
    let server = HttpServer::new(config, pixel, Arc::new(pool));
    let served = match tls {
        Some(tls) => server.run_tls(listener, tls, server_shutdown).await,
        None => server.run(listener, server_shutdown).await,
    };

    // The server owned the last pool handle; workers now drain and exit.
    if workers.join(drain_timeout).await {
        tracing::info!("Processing pool drained");
    } else {
        tracing::warn!(
            timeout_secs = drain_timeout.as_secs(),
            "Processing pool did not drain before timeout"
        );
    }

    served.map_err(StartupError::Serve)
}
