//! # Database Schema Provisioner
//!
//! Entry point for the one-shot provisioning Job.
//!
//! ```bash
//! # Provision schema, user and Secret
//! db-schema-provisioner
//!
//! # Validate configuration only, without touching MySQL or the Kubernetes API
//! db-schema-provisioner --check-config
//! ```

use clap::Parser;
use db_schema_provisioner::config::load_config;
use db_schema_provisioner::runtime::{
    handle_provisioning_error, initialize, run, FAILURE_EXIT_CODE,
};
use std::process::ExitCode;
use tracing::info;

/// Provision a MySQL schema and user, and publish the credentials as a Kubernetes Secret
#[derive(Debug, Parser)]
#[command(name = "db-schema-provisioner", version)]
#[command(about = "Provision a MySQL schema and least-privilege user, then publish the credentials as a Kubernetes Secret", long_about = None)]
struct Cli {
    /// Load and validate configuration, then exit without any network call
    #[arg(long)]
    check_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = initialize() {
        eprintln!("Initialization failed: {e:#}");
        return ExitCode::from(FAILURE_EXIT_CODE);
    }

    // Configuration errors are reported before any connection is attempted
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => return handle_provisioning_error(&e),
    };

    if cli.check_config {
        info!("Configuration is valid: {:?}", config);
        return ExitCode::SUCCESS;
    }

    match run(&config).await {
        Ok(report) => {
            info!(
                schema = ?report.schema,
                user = ?report.user,
                secret = %report.secret,
                "Database schema creation and Kubernetes Secret setup completed successfully!"
            );
            ExitCode::SUCCESS
        }
        Err(e) => handle_provisioning_error(&e),
    }
}
