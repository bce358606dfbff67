//! Shared fakes for workflow tests
//!
//! `FakeDatabase` and `FakeSecretStore` write into one event log so tests can
//! assert ordering across the database and the Kubernetes API.

#![allow(dead_code, reason = "not every test binary uses every helper")]

use async_trait::async_trait;
use db_schema_provisioner::config::ProvisioningConfig;
use db_schema_provisioner::credentials::GeneratedCredential;
use db_schema_provisioner::database::{Account, DatabaseAdmin, SchemaOutcome, UserOutcome};
use db_schema_provisioner::kubernetes::SecretStore;
use db_schema_provisioner::{ProvisionError, Result};
use k8s_openapi::api::core::v1::Secret;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CreateSchema(String),
    ProvisionUser(String),
    CloseDatabase,
    SecretExists(String),
    CreateSecret(String),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

pub fn events(log: &EventLog) -> Vec<Event> {
    log.lock().unwrap().clone()
}

/// Simulated MySQL server state, shared across connections
#[derive(Debug, Default)]
pub struct ServerState {
    pub schemas: BTreeSet<String>,
    /// account -> current password
    pub users: BTreeMap<String, String>,
    /// account -> schemas granted
    pub grants: BTreeMap<String, BTreeSet<String>>,
}

pub type SharedServer = Arc<Mutex<ServerState>>;

/// In-memory [`DatabaseAdmin`]
#[derive(Debug)]
pub struct FakeDatabase {
    pub server: SharedServer,
    pub events: EventLog,
    /// Operation that fails: "create_schema" or "provision_user"
    pub fail_on: Option<&'static str>,
    pub closed: bool,
}

impl FakeDatabase {
    pub fn new(server: SharedServer, events: EventLog) -> Self {
        Self {
            server,
            events,
            fail_on: None,
            closed: false,
        }
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait(?Send)]
impl DatabaseAdmin for FakeDatabase {
    async fn create_schema(&mut self, schema: &str) -> Result<SchemaOutcome> {
        assert!(!self.closed, "schema created on a closed connection");
        self.record(Event::CreateSchema(schema.to_string()));
        if self.fail_on == Some("create_schema") {
            return Err(ProvisionError::database(
                "create_schema",
                schema,
                "Access denied for user 'root'@'%' to database",
            ));
        }
        let created = self.server.lock().unwrap().schemas.insert(schema.to_string());
        Ok(if created {
            SchemaOutcome::Created
        } else {
            SchemaOutcome::AlreadyExisted
        })
    }

    async fn provision_user(
        &mut self,
        account: &Account,
        credential: &GeneratedCredential,
    ) -> Result<UserOutcome> {
        assert!(!self.closed, "user provisioned on a closed connection");
        let key = account.to_string();
        self.record(Event::ProvisionUser(key.clone()));
        if self.fail_on == Some("provision_user") {
            return Err(ProvisionError::database(
                "grant",
                key,
                "Access denied; you need the GRANT OPTION privilege",
            ));
        }
        let mut server = self.server.lock().unwrap();
        let existed = server
            .users
            .insert(key.clone(), credential.password().to_string())
            .is_some();
        server
            .grants
            .entry(key)
            .or_default()
            .insert(credential.schema().to_string());
        Ok(if existed {
            UserOutcome::PasswordReset
        } else {
            UserOutcome::Created
        })
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.record(Event::CloseDatabase);
        }
        Ok(())
    }
}

/// In-memory [`SecretStore`] with Kubernetes create semantics
#[derive(Debug, Default)]
pub struct FakeSecretStore {
    pub secrets: Mutex<BTreeMap<String, Secret>>,
    pub events: EventLog,
    /// Simulate a Secret appearing between the existence check and the create
    pub conflict_on_create: bool,
}

impl FakeSecretStore {
    pub fn new(events: EventLog) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn with_existing(self, namespace: &str, name: &str) -> Self {
        let mut secret = Secret::default();
        secret.metadata.name = Some(name.to_string());
        secret.metadata.namespace = Some(namespace.to_string());
        self.secrets
            .lock()
            .unwrap()
            .insert(format!("{namespace}/{name}"), secret);
        self
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<Secret> {
        self.secrets
            .lock()
            .unwrap()
            .get(&format!("{namespace}/{name}"))
            .cloned()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl SecretStore for FakeSecretStore {
    async fn secret_exists(&self, namespace: &str, name: &str) -> Result<bool> {
        let key = format!("{namespace}/{name}");
        self.record(Event::SecretExists(key.clone()));
        Ok(self.secrets.lock().unwrap().contains_key(&key))
    }

    async fn create_secret(&self, secret: &Secret) -> Result<()> {
        let namespace = secret.metadata.namespace.clone().unwrap_or_default();
        let name = secret.metadata.name.clone().unwrap_or_default();
        let key = format!("{namespace}/{name}");
        self.record(Event::CreateSecret(key.clone()));

        let mut secrets = self.secrets.lock().unwrap();
        if self.conflict_on_create || secrets.contains_key(&key) {
            return Err(ProvisionError::SecretConflict { namespace, name });
        }
        secrets.insert(key, secret.clone());
        Ok(())
    }
}

/// Configuration for the `appdb` scenario, with optional overrides
pub fn config_with(overrides: &[(&'static str, &'static str)]) -> ProvisioningConfig {
    let mut env: HashMap<&str, &str> = HashMap::from([
        ("MYSQL_HOST", "mysql.db.svc"),
        ("MYSQL_ROOT_USER", "root"),
        ("MYSQL_ROOT_PASSWORD", "rootpw"),
        ("SCHEMA_NAME", "appdb"),
        ("DB_USER", "appuser"),
        ("K8S_NAMESPACE", "default"),
        ("SECRET_NAME", "appdb-creds"),
    ]);
    env.extend(overrides.iter().copied());
    ProvisioningConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_string()))
        .expect("test configuration is valid")
}

/// Decode one field of a stored Secret
pub fn secret_field(secret: &Secret, key: &str) -> String {
    let bytes = &secret.data.as_ref().expect("secret has data")[key].0;
    String::from_utf8(bytes.clone()).expect("utf-8 value")
}
