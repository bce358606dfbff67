//! # Initialization
//!
//! Process setup performed before any provisioning step: rustls crypto
//! provider, tracing subscriber and the startup banner.

use crate::constants::DEFAULT_LOG_FILTER;
use anyhow::Result;
use tracing::{info, warn};

/// Initialize the process runtime
///
/// # Errors
///
/// Returns an error if the rustls crypto provider cannot be installed.
pub fn initialize() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any TLS connection is made.
    // Required for rustls 0.23+ when no default provider is set via features.
    // Both the Kubernetes client and the MySQL connection use rustls.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|existing| {
            anyhow::anyhow!("Failed to install rustls crypto provider, one is already installed: {existing:?}")
        })?;

    init_tracing();

    info!("Starting Database Schema Provisioner v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    Ok(())
}

/// Install the `fmt` subscriber with `RUST_LOG` or the default filter
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .try_init()
    {
        // Already initialized (tests install their own subscriber)
        warn!("Tracing subscriber init returned error: {}", e);
    }
}
