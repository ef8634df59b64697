//! TLS termination support.
//!
//! # Responsibilities
//! - Load certificate chain and private key (PEM) at startup
//!
//! # Design Decisions
//! - Uses rustls via axum-server
//! - Certificates are read once; rotation requires a restart

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the rustls server configuration from PEM files.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, std::io::Error> {
    let rustls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path).await?;
    tracing::info!(cert_path = %config.cert_path, "TLS certificate loaded");
    Ok(rustls)
}
