//! # Database Provisioning
//!
//! Schema creation and least-privilege user provisioning against MySQL.
//!
//! The [`DatabaseAdmin`] trait is the seam between the provisioning workflow and
//! the server; [`MySqlAdmin`] is the production implementation.

mod mysql;
pub mod statements;

pub use mysql::MySqlAdmin;

use crate::credentials::GeneratedCredential;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// A MySQL account, `'user'@'host'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub user: String,
    pub host: String,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'@'{}'", self.user, self.host)
    }
}

/// Result of the schema step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    Created,
    AlreadyExisted,
}

/// Result of the user step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOutcome {
    /// New account created with the generated password
    Created,
    /// Existing account; password reset and grants re-applied
    PasswordReset,
}

/// Administrative operations needed for one provisioning run
///
/// Futures are not `Send`: the run is sequential on a current-thread runtime
/// and the sqlx executor futures borrow the connection across awaits.
#[async_trait(?Send)]
pub trait DatabaseAdmin {
    /// Create `schema` if it does not exist
    async fn create_schema(&mut self, schema: &str) -> Result<SchemaOutcome>;

    /// Create or reset `account`, grant it all privileges on the credential's
    /// schema only, and verify no broader grant remains.
    async fn provision_user(
        &mut self,
        account: &Account,
        credential: &GeneratedCredential,
    ) -> Result<UserOutcome>;

    /// Release the connection. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
