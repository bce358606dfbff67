//! # MySQL Admin Connection
//!
//! A single administrative `sqlx` connection (no pool) used for the DDL phase.
//! Statement logging is disabled on the connection because the user
//! statements embed the generated password.

use super::statements::{
    create_schema_sql, create_user_sql, excess_grants, grant_schema_sql, reset_password_sql,
    schema_exists_sql, show_grants_sql, user_exists_sql, FLUSH_PRIVILEGES_SQL,
};
use super::{Account, DatabaseAdmin, SchemaOutcome, UserOutcome};
use crate::config::DatabaseConfig;
use crate::credentials::GeneratedCredential;
use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Production [`DatabaseAdmin`] backed by one MySQL connection
pub struct MySqlAdmin {
    conn: Option<MySqlConnection>,
    endpoint: String,
    statement_timeout: Duration,
}

impl std::fmt::Debug for MySqlAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdmin")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.conn.is_some())
            .finish_non_exhaustive()
    }
}

impl MySqlAdmin {
    /// Open the administrative connection
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Database` on network, TLS, authentication
    /// failure or when the connect timeout elapses.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let endpoint = format!("{}:{}", config.host, config.port);
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.admin_user)
            .password(config.admin_password.as_str())
            .disable_statement_logging();

        debug!("Connecting to MySQL at {} as '{}'", endpoint, config.admin_user);
        let conn = with_timeout(config.connect_timeout, "connect", &endpoint, None, async {
            options.connect().await
        })
        .await?;
        info!("Successfully connected to MySQL server at {}", endpoint);

        Ok(Self {
            conn: Some(conn),
            endpoint,
            statement_timeout: config.statement_timeout,
        })
    }

    fn connection(&mut self, operation: &'static str, target: &str) -> Result<&mut MySqlConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| ProvisionError::database(operation, target, "connection already closed"))
    }

    /// Run a statement over the text protocol. `secret` is scrubbed from any error message.
    async fn execute(
        &mut self,
        operation: &'static str,
        target: &str,
        sql: &str,
        secret: Option<&str>,
    ) -> Result<()> {
        let timeout = self.statement_timeout;
        let conn = self.connection(operation, target)?;
        with_timeout(timeout, operation, target, secret, async {
            sqlx::raw_sql(sql).execute(&mut *conn).await
        })
        .await?;
        Ok(())
    }

    async fn count(
        &mut self,
        operation: &'static str,
        target: &str,
        sql: &'static str,
        binds: &[&str],
    ) -> Result<i64> {
        let timeout = self.statement_timeout;
        let conn = self.connection(operation, target)?;
        let mut query = sqlx::query_scalar::<sqlx::MySql, i64>(sql);
        for value in binds {
            query = query.bind(*value);
        }
        with_timeout(timeout, operation, target, None, async {
            query.fetch_one(&mut *conn).await
        })
        .await
    }

    async fn show_grants(&mut self, account: &Account) -> Result<Vec<String>> {
        let timeout = self.statement_timeout;
        let target = account.to_string();
        let sql = show_grants_sql(account);
        let conn = self.connection("show_grants", &target)?;
        let rows = with_timeout(timeout, "show_grants", &target, None, async {
            sqlx::raw_sql(&sql).fetch_all(&mut *conn).await
        })
        .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<Vec<u8>, _>(0)
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .map_err(|e| ProvisionError::database("show_grants", target.as_str(), e))
            })
            .collect()
    }
}

#[async_trait(?Send)]
impl DatabaseAdmin for MySqlAdmin {
    async fn create_schema(&mut self, schema: &str) -> Result<SchemaOutcome> {
        let existing = self
            .count("check_schema", schema, schema_exists_sql(), &[schema])
            .await?;
        if existing > 0 {
            warn!("Schema '{}' already exists", schema);
            return Ok(SchemaOutcome::AlreadyExisted);
        }

        self.execute("create_schema", schema, &create_schema_sql(schema), None)
            .await?;
        info!("Successfully created schema '{}'", schema);
        Ok(SchemaOutcome::Created)
    }

    async fn provision_user(
        &mut self,
        account: &Account,
        credential: &GeneratedCredential,
    ) -> Result<UserOutcome> {
        let target = account.to_string();
        let schema = credential.schema();
        let password = credential.password();

        let existed = self
            .count("check_user", &target, user_exists_sql(), &[account.user.as_str(), account.host.as_str()])
            .await?
            > 0;

        self.execute(
            "create_user",
            &target,
            &create_user_sql(account, password),
            Some(password),
        )
        .await?;

        let outcome = if existed {
            self.execute(
                "reset_password",
                &target,
                &reset_password_sql(account, password),
                Some(password),
            )
            .await?;
            info!("User {} already existed, password reset", target);
            UserOutcome::PasswordReset
        } else {
            info!("Successfully created user {}", target);
            UserOutcome::Created
        };

        self.execute("grant", &target, &grant_schema_sql(account, schema), None)
            .await?;
        self.execute("flush_privileges", &target, FLUSH_PRIVILEGES_SQL, None)
            .await?;

        let grants = self.show_grants(account).await?;
        let excess = excess_grants(&grants, schema);
        if !excess.is_empty() {
            return Err(ProvisionError::database(
                "verify_grants",
                target,
                format!(
                    "account holds privileges beyond schema '{schema}': {}",
                    excess.join(" | ")
                ),
            ));
        }
        info!(
            "Successfully granted all privileges on '{}' to user {}",
            schema, target
        );

        Ok(outcome)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close()
                .await
                .map_err(|e| ProvisionError::database("close", self.endpoint.as_str(), e))?;
            info!("MySQL connection closed");
        }
        Ok(())
    }
}

/// Await `fut` under `timeout`, mapping both failure kinds to a database error
async fn with_timeout<T, F>(
    timeout: Duration,
    operation: &'static str,
    target: &str,
    secret: Option<&str>,
    fut: F,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let mut message = e.to_string();
            if let Some(secret) = secret.filter(|s| !s.is_empty()) {
                message = message.replace(secret, "<redacted>");
            }
            Err(ProvisionError::database(operation, target, message))
        }
        Err(_) => Err(ProvisionError::database(
            operation,
            target,
            format!("timed out after {}s", timeout.as_secs()),
        )),
    }
}
