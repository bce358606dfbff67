//! # Provisioning Workflow Tests
//!
//! Exercise the full Schema → User → Secret sequence against in-memory fakes.
//!
//! These tests verify:
//! - End-to-end outcome for the `appdb` scenario
//! - Idempotent re-runs against an existing schema and user
//! - Fail-closed publication when the Secret already exists
//! - Step ordering and connection release on every failure path
//! - Generated passwords are distinct and never logged

mod common;

use common::*;
use db_schema_provisioner::credentials::meets_policy;
use db_schema_provisioner::database::{SchemaOutcome, UserOutcome};
use db_schema_provisioner::runtime::{provision, ProvisioningStage};
use db_schema_provisioner::ProvisionError;
use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_end_to_end_appdb_scenario() {
    let config = config_with(&[]);
    let log = EventLog::default();
    let server = SharedServer::default();
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let store = FakeSecretStore::new(log.clone());

    let report = provision(&config, &mut database, &store).await.unwrap();

    assert_eq!(report.schema, SchemaOutcome::Created);
    assert_eq!(report.user, UserOutcome::Created);
    assert_eq!(report.secret, "default/appdb-creds");
    assert_eq!(report.stage, ProvisioningStage::SecretPublished);

    // Database side: schema and a user granted on that schema only
    let state = server.lock().unwrap();
    assert!(state.schemas.contains("appdb"));
    let granted: Vec<&String> = state.grants["'appuser'@'%'"].iter().collect();
    assert_eq!(granted, vec!["appdb"]);

    // Orchestration side: decoded fields match the request
    let secret = store.get("default", "appdb-creds").expect("secret published");
    assert_eq!(secret_field(&secret, "database"), "appdb");
    assert_eq!(secret_field(&secret, "username"), "appuser");
    assert_eq!(
        secret_field(&secret, "password"),
        state.users["'appuser'@'%'"],
        "published password matches the one set on the account"
    );
    assert_eq!(secret.type_.as_deref(), Some("Opaque"));

    assert_eq!(
        events(&log),
        vec![
            Event::CreateSchema("appdb".to_string()),
            Event::ProvisionUser("'appuser'@'%'".to_string()),
            Event::CloseDatabase,
            Event::SecretExists("default/appdb-creds".to_string()),
            Event::CreateSecret("default/appdb-creds".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent_for_schema_and_user() {
    let server = SharedServer::default();
    let log = EventLog::default();

    let first = config_with(&[("SECRET_NAME", "appdb-creds-1")]);
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let store = FakeSecretStore::new(log.clone());
    provision(&first, &mut database, &store).await.unwrap();
    let first_password = server.lock().unwrap().users["'appuser'@'%'"].clone();

    let second = config_with(&[("SECRET_NAME", "appdb-creds-2")]);
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let report = provision(&second, &mut database, &store).await.unwrap();

    assert_eq!(report.schema, SchemaOutcome::AlreadyExisted);
    assert_eq!(report.user, UserOutcome::PasswordReset);

    let state = server.lock().unwrap();
    assert_eq!(state.schemas.len(), 1, "no duplicate schema");
    assert_eq!(state.users.len(), 1, "no duplicate principal");
    assert_ne!(state.users["'appuser'@'%'"], first_password, "password was reset");
}

#[tokio::test]
async fn test_existing_secret_fails_closed_after_ddl() {
    let config = config_with(&[]);
    let log = EventLog::default();
    let server = SharedServer::default();
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let store = FakeSecretStore::new(log.clone()).with_existing("default", "appdb-creds");

    let err = provision(&config, &mut database, &store).await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::SecretConflict { ref namespace, ref name }
            if namespace == "default" && name == "appdb-creds"
    ));

    // The existing Secret is untouched
    let existing = store.get("default", "appdb-creds").unwrap();
    assert!(existing.data.is_none());

    // DDL ran before the check; nothing touched the database after it
    let events = events(&log);
    assert_eq!(
        events,
        vec![
            Event::CreateSchema("appdb".to_string()),
            Event::ProvisionUser("'appuser'@'%'".to_string()),
            Event::CloseDatabase,
            Event::SecretExists("default/appdb-creds".to_string()),
        ]
    );
    let check = events
        .iter()
        .position(|e| matches!(e, Event::SecretExists(_)))
        .unwrap();
    assert!(events[check..]
        .iter()
        .all(|e| matches!(e, Event::SecretExists(_) | Event::CreateSecret(_))));

    // Database objects are left in place
    assert!(server.lock().unwrap().schemas.contains("appdb"));
}

#[tokio::test]
async fn test_conflict_during_create_is_a_secret_conflict() {
    let config = config_with(&[]);
    let log = EventLog::default();
    let mut database = FakeDatabase::new(SharedServer::default(), log.clone());
    let store = FakeSecretStore {
        conflict_on_create: true,
        ..FakeSecretStore::new(log.clone())
    };

    let err = provision(&config, &mut database, &store).await.unwrap_err();
    assert_eq!(err.reason(), "secret_conflict");
    assert_eq!(
        events(&log).last(),
        Some(&Event::CreateSecret("default/appdb-creds".to_string()))
    );
}

#[tokio::test]
async fn test_schema_failure_stops_before_user_and_secret() {
    let config = config_with(&[]);
    let log = EventLog::default();
    let mut database =
        FakeDatabase::new(SharedServer::default(), log.clone()).failing_on("create_schema");
    let store = FakeSecretStore::new(log.clone());

    let err = provision(&config, &mut database, &store).await.unwrap_err();

    assert_eq!(err.reason(), "database_error");
    assert!(database.closed, "connection released on failure");
    assert_eq!(
        events(&log),
        vec![Event::CreateSchema("appdb".to_string()), Event::CloseDatabase]
    );
}

#[tokio::test]
async fn test_user_failure_publishes_nothing() {
    let config = config_with(&[]);
    let log = EventLog::default();
    let mut database =
        FakeDatabase::new(SharedServer::default(), log.clone()).failing_on("provision_user");
    let store = FakeSecretStore::new(log.clone());

    let err = provision(&config, &mut database, &store).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Database { operation: "grant", .. }));
    assert!(database.closed);
    assert!(store.get("default", "appdb-creds").is_none());
    assert!(!events(&log)
        .iter()
        .any(|e| matches!(e, Event::SecretExists(_) | Event::CreateSecret(_))));
}

#[tokio::test]
async fn test_custom_user_host_is_used_for_the_account() {
    let config = config_with(&[("DB_USER_HOST", "10.0.%")]);
    let log = EventLog::default();
    let server = SharedServer::default();
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let store = FakeSecretStore::new(log.clone());

    provision(&config, &mut database, &store).await.unwrap();
    assert!(server.lock().unwrap().users.contains_key("'appuser'@'10.0.%'"));
}

#[tokio::test]
async fn test_passwords_distinct_across_runs_and_meet_policy() {
    let server = SharedServer::default();
    let store = FakeSecretStore::new(EventLog::default());
    let mut seen = HashSet::new();

    for run in 0..25 {
        let config = config_with(&[]);
        let mut database = FakeDatabase::new(server.clone(), EventLog::default());
        // Fresh secret name per run so publication succeeds
        let name = format!("appdb-creds-{run}");
        let config = db_schema_provisioner::ProvisioningConfig {
            kubernetes: db_schema_provisioner::config::KubernetesConfig {
                secret_name: name.clone(),
                ..config.kubernetes.clone()
            },
            ..config
        };
        provision(&config, &mut database, &store).await.unwrap();

        let secret = store.get("default", &name).unwrap();
        let password = secret_field(&secret, "password");
        assert!(meets_policy(&password, 16));
        assert!(seen.insert(password), "password repeated on run {run}");
    }
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_generated_password_is_never_logged() {
    let captured = CapturedLogs::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = config_with(&[]);
    let log = EventLog::default();
    let server = SharedServer::default();
    let mut database = FakeDatabase::new(server.clone(), log.clone());
    let store = FakeSecretStore::new(log);
    provision(&config, &mut database, &store).await.unwrap();

    let password = server.lock().unwrap().users["'appuser'@'%'"].clone();
    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("Generated password for user 'appuser'@'%'"));
    assert!(output.contains("SecretPublished"));
    assert!(!output.contains(&password), "password leaked into logs");
    assert!(!output.contains("rootpw"), "admin password leaked into logs");
}
