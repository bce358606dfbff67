//! # Provisioning Workflow
//!
//! Runs the three steps strictly in order:
//!
//! `Init → SchemaCreated → UserCreated → SecretPublished`
//!
//! Any failure ends the run where it occurred. Nothing is retried, and nothing
//! already applied to the database is rolled back when a later step fails.

use crate::config::ProvisioningConfig;
use crate::credentials::GeneratedCredential;
use crate::database::{DatabaseAdmin, SchemaOutcome, UserOutcome};
use crate::error::Result;
use crate::kubernetes::{publish_credentials, SecretStore};
use std::fmt;
use tracing::{info, warn, Instrument};

/// Position in the provisioning state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningStage {
    Init,
    SchemaCreated,
    UserCreated,
    SecretPublished,
}

impl fmt::Display for ProvisioningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "Init",
            Self::SchemaCreated => "SchemaCreated",
            Self::UserCreated => "UserCreated",
            Self::SecretPublished => "SecretPublished",
        };
        f.write_str(name)
    }
}

/// Summary of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningReport {
    pub schema: SchemaOutcome,
    pub user: UserOutcome,
    /// `namespace/name` of the published Secret
    pub secret: String,
    pub stage: ProvisioningStage,
}

fn transition(stage: ProvisioningStage) {
    info!(stage = %stage, "provisioning.stage");
}

/// DDL phase: schema, then password generation and the scoped user
async fn provision_database(
    config: &ProvisioningConfig,
    admin: &mut dyn DatabaseAdmin,
) -> Result<(SchemaOutcome, UserOutcome, GeneratedCredential)> {
    let schema_outcome = async {
        info!("Creating schema '{}'", config.schema_name);
        admin.create_schema(&config.schema_name).await
    }
    .instrument(tracing::info_span!("provision.schema", schema = %config.schema_name))
    .await?;
    transition(ProvisioningStage::SchemaCreated);

    let account = config.account();
    let credential =
        GeneratedCredential::generate(&config.db_user, &config.schema_name, config.password_length);
    info!("Generated password for user {}", account);

    let user_outcome = async {
        info!("Creating user {} and granting permissions", account);
        admin.provision_user(&account, &credential).await
    }
    .instrument(tracing::info_span!("provision.user", account = %account))
    .await?;
    transition(ProvisioningStage::UserCreated);

    Ok((schema_outcome, user_outcome, credential))
}

/// Run the whole provisioning sequence
///
/// The database connection is closed once the DDL phase ends, on success or
/// failure, before the Secret is published.
///
/// # Errors
///
/// Returns the first `ProvisionError` encountered; later steps do not run.
pub async fn provision(
    config: &ProvisioningConfig,
    admin: &mut dyn DatabaseAdmin,
    store: &dyn SecretStore,
) -> Result<ProvisioningReport> {
    transition(ProvisioningStage::Init);

    let database_result = provision_database(config, admin).await;
    if let Err(e) = admin.close().await {
        warn!("Failed to close MySQL connection cleanly: {}", e);
    }
    let (schema, user, credential) = database_result?;

    async {
        info!(
            "Creating Kubernetes Secret '{}' in namespace '{}'",
            config.kubernetes.secret_name, config.kubernetes.namespace
        );
        publish_credentials(store, config, &credential).await
    }
    .instrument(tracing::info_span!("provision.secret", secret = %config.secret_ref()))
    .await?;
    transition(ProvisioningStage::SecretPublished);

    Ok(ProvisioningReport {
        schema,
        user,
        secret: config.secret_ref(),
        stage: ProvisioningStage::SecretPublished,
    })
}
