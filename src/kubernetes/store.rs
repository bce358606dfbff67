//! # Secret Store
//!
//! The platform seam for Secret publication. [`KubeSecretStore`] talks to the
//! Kubernetes API; tests substitute their own [`SecretStore`].

use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, PostParams};
use kube::Client;
use tracing::debug;

/// Minimal Secret operations needed to publish credentials
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Whether a Secret named `name` exists in `namespace`
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool>;

    /// Create `secret`. Must fail with `ProvisionError::SecretConflict` if it
    /// already exists; never updates.
    async fn create_secret(&self, secret: &Secret) -> Result<()>;
}

/// [`SecretStore`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Map a kube error to an orchestration error, keeping the HTTP status
fn api_error(operation: &'static str, target: String, error: kube::Error) -> ProvisionError {
    match error {
        kube::Error::Api(response) => ProvisionError::orchestration(
            operation,
            target,
            Some(response.code),
            format!("{}: {}", response.reason, response.message),
        ),
        other => ProvisionError::orchestration(operation, target, None, other),
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool> {
        let target = format!("{namespace}/{name}");
        debug!("Checking whether Secret {} exists", target);
        let existing = self
            .api(namespace)
            .get_metadata_opt(name)
            .await
            .map_err(|e| api_error("get_secret", target, e))?;
        Ok(existing.is_some())
    }

    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.metadata.namespace.as_deref().unwrap_or_default();
        let name = secret.metadata.name.as_deref().unwrap_or_default();
        let target = format!("{namespace}/{name}");

        match self
            .api(namespace)
            .create(&PostParams::default(), secret)
            .await
        {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 409 => {
                Err(ProvisionError::SecretConflict {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            Err(e) => Err(api_error("create_secret", target, e)),
        }
    }
}
