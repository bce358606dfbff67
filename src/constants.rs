//! # Constants
//!
//! Environment variable names, defaults and fixed values used across the provisioner.

/// Application name, used for the `app` label on published Secrets
pub const APP_NAME: &str = "db-schema-provisioner";

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "db_schema_provisioner=info";

// Required inputs
pub const ENV_MYSQL_HOST: &str = "MYSQL_HOST";
pub const ENV_MYSQL_ROOT_USER: &str = "MYSQL_ROOT_USER";
pub const ENV_MYSQL_ROOT_PASSWORD: &str = "MYSQL_ROOT_PASSWORD";
pub const ENV_SCHEMA_NAME: &str = "SCHEMA_NAME";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_K8S_NAMESPACE: &str = "K8S_NAMESPACE";
pub const ENV_SECRET_NAME: &str = "SECRET_NAME";

// Optional inputs
pub const ENV_MYSQL_PORT: &str = "MYSQL_PORT";
pub const ENV_DB_USER_HOST: &str = "DB_USER_HOST";
pub const ENV_DB_PASSWORD_LENGTH: &str = "DB_PASSWORD_LENGTH";
pub const ENV_MYSQL_CONNECT_TIMEOUT_SECS: &str = "MYSQL_CONNECT_TIMEOUT_SECS";
pub const ENV_MYSQL_STATEMENT_TIMEOUT_SECS: &str = "MYSQL_STATEMENT_TIMEOUT_SECS";
pub const ENV_K8S_CONNECT_TIMEOUT_SECS: &str = "K8S_CONNECT_TIMEOUT_SECS";
pub const ENV_K8S_READ_TIMEOUT_SECS: &str = "K8S_READ_TIMEOUT_SECS";
pub const ENV_K8S_AUTH_MODE: &str = "K8S_AUTH_MODE";

/// Default MySQL port
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default host part of the provisioned account (`'user'@'%'`)
pub const DEFAULT_DB_USER_HOST: &str = "%";

/// Default generated password length
pub const DEFAULT_PASSWORD_LENGTH: usize = 24;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 16;

/// Upper bound on password length (MySQL accepts longer, but nothing needs it)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// MySQL connection establishment timeout (seconds)
pub const DEFAULT_MYSQL_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Per-statement timeout (seconds)
pub const DEFAULT_MYSQL_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// Kubernetes API connect timeout (seconds)
pub const DEFAULT_K8S_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Kubernetes API read timeout (seconds)
pub const DEFAULT_K8S_READ_TIMEOUT_SECS: u64 = 30;

/// Mounted service account token (read by the in-cluster client config)
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

/// Mounted cluster CA bundle (read by the in-cluster client config)
pub const SERVICE_ACCOUNT_CA_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

/// Annotation recording when the Secret was published
pub const PROVISIONED_AT_ANNOTATION: &str = "db-schema-provisioner.io/provisioned-at";

/// Secret data keys
pub const SECRET_KEY_USERNAME: &str = "username";
pub const SECRET_KEY_PASSWORD: &str = "password";
pub const SECRET_KEY_DATABASE: &str = "database";
pub const SECRET_KEY_HOST: &str = "host";
pub const SECRET_KEY_PORT: &str = "port";
pub const SECRET_KEY_CONNECTION_STRING: &str = "connection-string";
