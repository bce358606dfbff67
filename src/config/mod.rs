//! # Configuration
//!
//! Run configuration loaded once from environment variables (populated from the
//! Job spec) and passed explicitly to each step.
//!
//! Required: `MYSQL_HOST`, `MYSQL_ROOT_USER`, `MYSQL_ROOT_PASSWORD`, `SCHEMA_NAME`,
//! `DB_USER`, `K8S_NAMESPACE`, `SECRET_NAME`. Everything else has a default.

mod provisioning;
pub mod validation;

pub use provisioning::{AuthMode, DatabaseConfig, KubernetesConfig, ProvisioningConfig};

use crate::error::Result;

/// Load configuration from environment variables
pub fn load_config() -> Result<ProvisioningConfig> {
    ProvisioningConfig::from_env()
}
