//! # Provisioning Configuration
//!
//! Immutable run configuration built once from environment variables.

use crate::constants::*;
use crate::error::{ProvisionError, Result};
use crate::database::Account;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroizing;

use super::validation::{
    validate_host, validate_namespace, validate_object_name, validate_schema_name, validate_user_host,
    validate_user_name,
};

/// Administrative MySQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub admin_user: String,
    pub admin_password: Zeroizing<String>,
    /// Bound on connection establishment
    pub connect_timeout: Duration,
    /// Bound on each individual statement
    pub statement_timeout: Duration,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

/// How the Kubernetes client authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Mounted service account token and CA bundle
    #[default]
    InCluster,
    /// Explicit credentials from a kubeconfig (local runs and tests)
    Kubeconfig,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in-cluster" | "incluster" => Ok(Self::InCluster),
            "kubeconfig" => Ok(Self::Kubeconfig),
            other => Err(format!(
                "unknown auth mode '{other}', expected 'in-cluster' or 'kubeconfig'"
            )),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InCluster => f.write_str("in-cluster"),
            Self::Kubeconfig => f.write_str("kubeconfig"),
        }
    }
}

/// Kubernetes publication settings
#[derive(Debug, Clone)]
pub struct KubernetesConfig {
    pub namespace: String,
    pub secret_name: String,
    pub auth_mode: AuthMode,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

/// Everything one provisioning run needs
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    pub database: DatabaseConfig,
    pub schema_name: String,
    pub db_user: String,
    /// Host part of the account, `'db_user'@'db_user_host'`
    pub db_user_host: String,
    pub password_length: usize,
    pub kubernetes: KubernetesConfig,
}

/// Reads variables through a lookup function and collects every problem
struct EnvReader<F> {
    lookup: F,
    problems: Vec<String>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn new(lookup: F) -> Self {
        Self {
            lookup,
            problems: Vec::new(),
        }
    }

    /// Present and non-empty after trimming
    fn value(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&mut self, key: &str) -> String {
        self.value(key).unwrap_or_else(|| {
            self.problems
                .push(format!("required environment variable '{key}' is not set"));
            String::new()
        })
    }

    /// Secrets are taken verbatim; surrounding whitespace may be significant
    fn required_secret(&mut self, key: &str) -> Zeroizing<String> {
        match (self.lookup)(key).filter(|v| !v.is_empty()) {
            Some(v) => Zeroizing::new(v),
            None => {
                self.problems
                    .push(format!("required environment variable '{key}' is not set"));
                Zeroizing::new(String::new())
            }
        }
    }

    fn optional<T>(&mut self, key: &str, default: T) -> T
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.value(key) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                self.problems
                    .push(format!("environment variable '{key}' has invalid value '{raw}': {e}"));
                default
            }),
        }
    }

    fn check(&mut self, result: std::result::Result<(), String>) {
        if let Err(problem) = result {
            self.problems.push(problem);
        }
    }
}

impl ProvisioningConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (tests pass a map)
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Configuration` listing every missing or
    /// invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = EnvReader::new(lookup);

        let host = env.required(ENV_MYSQL_HOST);
        let port: u16 = env.optional(ENV_MYSQL_PORT, DEFAULT_MYSQL_PORT);
        let admin_user = env.required(ENV_MYSQL_ROOT_USER);
        let admin_password = env.required_secret(ENV_MYSQL_ROOT_PASSWORD);
        let schema_name = env.required(ENV_SCHEMA_NAME);
        let db_user = env.required(ENV_DB_USER);
        let namespace = env.required(ENV_K8S_NAMESPACE);
        let secret_name = env.required(ENV_SECRET_NAME);

        let db_user_host = env.optional(ENV_DB_USER_HOST, DEFAULT_DB_USER_HOST.to_string());
        let password_length = env.optional(ENV_DB_PASSWORD_LENGTH, DEFAULT_PASSWORD_LENGTH);
        let mysql_connect_timeout = env.optional(
            ENV_MYSQL_CONNECT_TIMEOUT_SECS,
            DEFAULT_MYSQL_CONNECT_TIMEOUT_SECS,
        );
        let mysql_statement_timeout = env.optional(
            ENV_MYSQL_STATEMENT_TIMEOUT_SECS,
            DEFAULT_MYSQL_STATEMENT_TIMEOUT_SECS,
        );
        let k8s_connect_timeout =
            env.optional(ENV_K8S_CONNECT_TIMEOUT_SECS, DEFAULT_K8S_CONNECT_TIMEOUT_SECS);
        let k8s_read_timeout =
            env.optional(ENV_K8S_READ_TIMEOUT_SECS, DEFAULT_K8S_READ_TIMEOUT_SECS);
        let auth_mode = env.optional(ENV_K8S_AUTH_MODE, AuthMode::default());

        // Only validate values that were actually supplied
        if !schema_name.is_empty() {
            env.check(validate_schema_name(&schema_name, ENV_SCHEMA_NAME));
        }
        if !db_user.is_empty() {
            env.check(validate_user_name(&db_user, ENV_DB_USER));
        }
        if !host.is_empty() {
            env.check(validate_host(&host, ENV_MYSQL_HOST));
        }
        env.check(validate_user_host(&db_user_host, ENV_DB_USER_HOST));
        if !namespace.is_empty() {
            env.check(validate_namespace(&namespace, ENV_K8S_NAMESPACE));
        }
        if !secret_name.is_empty() {
            env.check(validate_object_name(&secret_name, ENV_SECRET_NAME));
        }
        if port == 0 {
            env.problems
                .push(format!("{ENV_MYSQL_PORT} must be greater than 0"));
        }
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password_length) {
            env.problems.push(format!(
                "{ENV_DB_PASSWORD_LENGTH} must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {password_length}"
            ));
        }
        for (key, secs) in [
            (ENV_MYSQL_CONNECT_TIMEOUT_SECS, mysql_connect_timeout),
            (ENV_MYSQL_STATEMENT_TIMEOUT_SECS, mysql_statement_timeout),
            (ENV_K8S_CONNECT_TIMEOUT_SECS, k8s_connect_timeout),
            (ENV_K8S_READ_TIMEOUT_SECS, k8s_read_timeout),
        ] {
            if secs == 0 {
                env.problems.push(format!("{key} must be greater than 0"));
            }
        }

        if !env.problems.is_empty() {
            return Err(ProvisionError::Configuration {
                problems: env.problems,
            });
        }

        Ok(Self {
            database: DatabaseConfig {
                host,
                port,
                admin_user,
                admin_password,
                connect_timeout: Duration::from_secs(mysql_connect_timeout),
                statement_timeout: Duration::from_secs(mysql_statement_timeout),
            },
            schema_name,
            db_user,
            db_user_host,
            password_length,
            kubernetes: KubernetesConfig {
                namespace,
                secret_name,
                auth_mode,
                connect_timeout: Duration::from_secs(k8s_connect_timeout),
                read_timeout: Duration::from_secs(k8s_read_timeout),
            },
        })
    }

    /// `namespace/name` of the target Secret, for log lines
    pub fn secret_ref(&self) -> String {
        format!(
            "{}/{}",
            self.kubernetes.namespace, self.kubernetes.secret_name
        )
    }

    /// The MySQL account to provision
    pub fn account(&self) -> Account {
        Account {
            user: self.db_user.clone(),
            host: self.db_user_host.clone(),
        }
    }
}
