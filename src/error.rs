//! # Provisioning Error Types
//!
//! Every failure is terminal for the run. Each variant carries the operation
//! that was attempted and the object it targeted, plus remediation guidance
//! that is logged alongside the error.

use thiserror::Error;

/// Terminal provisioning failure
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Missing or invalid environment input. All problems are collected.
    #[error("invalid configuration: {}", problems.join("; "))]
    Configuration { problems: Vec<String> },

    /// Connection, DDL, grant or timeout failure against MySQL
    #[error("database operation '{operation}' failed for '{target}': {message}")]
    Database {
        operation: &'static str,
        target: String,
        message: String,
    },

    /// Target Secret already exists; it is never overwritten
    #[error("Secret '{name}' already exists in namespace '{namespace}'")]
    SecretConflict { namespace: String, name: String },

    /// Authentication, network or non-success status from the Kubernetes API
    #[error("Kubernetes API operation '{operation}' failed for '{target}'{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    OrchestrationApi {
        operation: &'static str,
        target: String,
        status: Option<u16>,
        message: String,
    },
}

impl ProvisionError {
    pub fn configuration(problem: impl Into<String>) -> Self {
        Self::Configuration {
            problems: vec![problem.into()],
        }
    }

    pub fn database(
        operation: &'static str,
        target: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Database {
            operation,
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn orchestration(
        operation: &'static str,
        target: impl Into<String>,
        status: Option<u16>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::OrchestrationApi {
            operation,
            target: target.into(),
            status,
            message: message.to_string(),
        }
    }

    /// Stable reason string for log fields
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::Database { .. } => "database_error",
            Self::SecretConflict { .. } => "secret_conflict",
            Self::OrchestrationApi { .. } => "orchestration_api_error",
        }
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            Self::Configuration { .. } => {
                "Set the listed environment variables on the Job (MYSQL_HOST, MYSQL_ROOT_USER, MYSQL_ROOT_PASSWORD, SCHEMA_NAME, DB_USER, K8S_NAMESPACE, SECRET_NAME are required).".to_string()
            }
            Self::Database { operation, .. } if *operation == "connect" => {
                "Verify MYSQL_HOST/MYSQL_PORT are reachable from the pod and the administrative credentials are correct.".to_string()
            }
            Self::Database { operation, .. } if *operation == "verify_grants" => {
                "The user holds privileges outside the target schema. Revoke them manually (SHOW GRANTS FOR the user) or choose a different DB_USER.".to_string()
            }
            Self::Database { .. } => {
                "Verify the administrative user has CREATE, CREATE USER and GRANT OPTION privileges. Database objects created before the failure are left in place; re-running is safe.".to_string()
            }
            Self::SecretConflict { namespace, name } => {
                format!(
                    "Refusing to overwrite existing credentials. Investigate the existing Secret and remove it if safe to do so (kubectl delete secret {name} -n {namespace}), or use a different SECRET_NAME."
                )
            }
            Self::OrchestrationApi { status: Some(401 | 403), .. } => {
                "Verify the Job's ServiceAccount is bound to a Role that allows 'get' and 'create' on secrets in the target namespace.".to_string()
            }
            Self::OrchestrationApi { .. } => {
                "Verify the Kubernetes API server is reachable from the pod and the mounted CA bundle is valid.".to_string()
            }
        }
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
