//! # Kubernetes Client
//!
//! Builds the `kube` client from the workload's ambient identity: the mounted
//! service account token and CA bundle, with the API server address taken from
//! `KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT`. TLS always verifies the
//! API server against the configured CA.

use crate::config::{AuthMode, KubernetesConfig};
use crate::constants::{SERVICE_ACCOUNT_CA_PATH, SERVICE_ACCOUNT_TOKEN_PATH};
use crate::error::{ProvisionError, Result};
use kube::{Client, Config};
use tracing::info;

/// Load client configuration for `auth_mode`
async fn load_kube_config(auth_mode: AuthMode) -> Result<Config> {
    match auth_mode {
        AuthMode::InCluster => {
            info!(
                "Using in-cluster service account identity (token: {}, CA: {})",
                SERVICE_ACCOUNT_TOKEN_PATH, SERVICE_ACCOUNT_CA_PATH
            );
            Config::incluster().map_err(|e| {
                ProvisionError::orchestration(
                    "load_incluster_config",
                    SERVICE_ACCOUNT_TOKEN_PATH,
                    None,
                    format!("{e}. Is the pod running with a mounted ServiceAccount token?"),
                )
            })
        }
        AuthMode::Kubeconfig => {
            info!("Using explicit credentials from kubeconfig");
            Config::infer().await.map_err(|e| {
                ProvisionError::orchestration("load_kubeconfig", "kubeconfig", None, e)
            })
        }
    }
}

/// Apply timeouts and refuse configurations that skip certificate verification
fn harden(mut kube_config: Config, config: &KubernetesConfig) -> Result<Config> {
    if kube_config.accept_invalid_certs {
        return Err(ProvisionError::configuration(
            "Kubernetes client configuration disables TLS verification (insecure-skip-tls-verify); refusing to publish credentials over an unverified connection",
        ));
    }
    kube_config.connect_timeout = Some(config.connect_timeout);
    kube_config.read_timeout = Some(config.read_timeout);
    kube_config.write_timeout = Some(config.read_timeout);
    Ok(kube_config)
}

/// Create the Kubernetes client. No network call is made here.
///
/// # Errors
///
/// Returns `ProvisionError::OrchestrationApi` when the identity cannot be
/// loaded, and `ProvisionError::Configuration` when TLS verification is
/// disabled.
pub async fn create_client(config: &KubernetesConfig) -> Result<Client> {
    let kube_config = harden(load_kube_config(config.auth_mode).await?, config)?;
    info!("Kubernetes API server: {}", kube_config.cluster_url);

    Client::try_from(kube_config).map_err(|e| {
        ProvisionError::orchestration("create_client", config.namespace.as_str(), None, e)
    })
}
