//! # Runtime Module
//!
//! Runtime components for the provisioner: initialization, the provisioning
//! workflow, and terminal error handling.

pub mod error_policy;
pub mod initialization;
pub mod workflow;

pub use error_policy::*;
pub use initialization::*;
pub use workflow::*;

use crate::config::ProvisioningConfig;
use crate::database::MySqlAdmin;
use crate::error::Result;
use crate::kubernetes::{create_client, KubeSecretStore};

/// Run against the real MySQL server and Kubernetes API
///
/// The Kubernetes client is built first: it only reads the mounted identity, so
/// a pod without a usable ServiceAccount fails before any DDL is issued.
pub async fn run(config: &ProvisioningConfig) -> Result<ProvisioningReport> {
    let client = create_client(&config.kubernetes).await?;
    let store = KubeSecretStore::new(client);

    let mut admin = MySqlAdmin::connect(&config.database).await?;
    provision(config, &mut admin, &store).await
}
