//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the beacon handler
//! - Wire up middleware (tracing, timeouts, request ID, concurrency limit)
//! - Bind server to listener, plain or TLS
//! - Gate, identify, acknowledge and dispatch each beacon request

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::CollectorConfig;
use crate::dispatch::{DispatchGateway, Event, ProcessingPool, RequestContext};
use crate::http::request::{self, gate};
use crate::http::response::{self, Pixel};
use crate::observability::metrics;
use crate::observability::tracing::request_span;
use crate::tracking::{IdentityManager, RequestCookies};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityManager>,
    pub pixel: Pixel,
    pub gateway: DispatchGateway,
}

/// HTTP server for the beacon endpoint.
pub struct HttpServer {
    router: Router,
    config: CollectorConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: CollectorConfig, pixel: Pixel, pool: Arc<dyn ProcessingPool>) -> Self {
        let state = AppState {
            identity: Arc::new(IdentityManager::from_config(&config.tracking)),
            pixel,
            gateway: DispatchGateway::new(pool),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CollectorConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.tracking.event_path, any(event_handler))
            .with_state(state)
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            // Outside the limit, so waiting for a permit counts against the timeout.
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(request::propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(request::set_request_id_layer())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.tracking.event_path,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination until `shutdown` fires.
    pub async fn run_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.tracking.event_path,
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }
}

/// Beacon handler.
/// Gates the method, resolves identities, composes the acknowledgment and
/// dispatches the event.
async fn event_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    if let Err(rejection) = gate(&method) {
        tracing::debug!(method = %method, "Rejected beacon request");
        metrics::record_request(method.as_str(), 405, start_time);
        return rejection.into_response();
    }

    let received_at = Utc::now();
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, _body) = request.into_parts();

    // 1. Resolve identities
    let cookies = RequestCookies::from_headers(&parts.headers);
    let identities = state.identity.resolve(&cookies, received_at);

    // 2. Compose the acknowledgment
    let mut response = response::accepted(&state.pixel);
    for cookie in identities.cookies() {
        match cookie.header_value() {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(cookie = %cookie.name, error = %e, "Skipping unrepresentable cookie");
            }
        }
    }

    // 3. Hand off for processing
    let context = RequestContext::from_parts(parts, remote_addr, received_at);
    state.gateway.dispatch(Event::new(
        identities.party.value,
        identities.session.value,
        context,
    ));

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
