//! # Secret Publication
//!
//! Publishes the generated credentials exactly once. An existing Secret with the
//! target name is never overwritten: publication fails closed with
//! `ProvisionError::SecretConflict`.

use super::secret::{build_secret, scrub_secret};
use super::store::SecretStore;
use crate::config::ProvisioningConfig;
use crate::credentials::GeneratedCredential;
use crate::error::{ProvisionError, Result};
use chrono::Utc;
use tracing::{error, info};

/// Fail with `SecretConflict` if the target Secret already exists
pub async fn ensure_secret_absent(
    store: &dyn SecretStore,
    namespace: &str,
    name: &str,
) -> Result<()> {
    if store.secret_exists(namespace, name).await? {
        error!(
            "Secret '{}' already exists in namespace '{}'. Existing credentials are never overwritten; investigate and remove the Secret if safe to do so, or use a different SECRET_NAME.",
            name, namespace
        );
        return Err(ProvisionError::SecretConflict {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Check for, then create, the credentials Secret
///
/// # Errors
///
/// `SecretConflict` if the Secret exists (before or during creation);
/// `OrchestrationApi` for any other API failure.
pub async fn publish_credentials(
    store: &dyn SecretStore,
    config: &ProvisioningConfig,
    credential: &GeneratedCredential,
) -> Result<()> {
    let namespace = config.kubernetes.namespace.as_str();
    let name = config.kubernetes.secret_name.as_str();

    ensure_secret_absent(store, namespace, name).await?;

    let mut secret = build_secret(config, credential, Utc::now());
    let result = store.create_secret(&secret).await;
    scrub_secret(&mut secret);
    result?;

    info!(
        "Successfully created Secret '{}' in namespace '{}'",
        name, namespace
    );
    Ok(())
}
