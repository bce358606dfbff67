//! # DDL Statements
//!
//! Builds the administrative statements issued against MySQL and checks the
//! resulting grants.
//!
//! Identifiers and literals are validated by the configuration layer before they
//! get here; quoting is still applied so a validation gap cannot become an
//! injection.

use super::Account;

/// Backtick-quote an identifier
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Single-quote a string literal
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// `'user'@'host'`
pub fn account_sql(account: &Account) -> String {
    format!("{}@{}", quote_string(&account.user), quote_string(&account.host))
}

/// Schema identifier as it must appear in a database-level GRANT.
///
/// `_` and `%` are wildcards in database-level grants, so they are escaped to
/// keep the grant to exactly one schema.
pub fn grant_identifier(schema: &str) -> String {
    let escaped = schema.replace('_', "\\_").replace('%', "\\%");
    quote_identifier(&escaped)
}

pub fn schema_exists_sql() -> &'static str {
    "SELECT COUNT(*) FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?"
}

pub fn user_exists_sql() -> &'static str {
    "SELECT COUNT(*) FROM mysql.user WHERE User = ? AND Host = ?"
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", quote_identifier(schema))
}

pub fn create_user_sql(account: &Account, password: &str) -> String {
    format!(
        "CREATE USER IF NOT EXISTS {} IDENTIFIED BY {}",
        account_sql(account),
        quote_string(password)
    )
}

pub fn reset_password_sql(account: &Account, password: &str) -> String {
    format!(
        "ALTER USER {} IDENTIFIED BY {}",
        account_sql(account),
        quote_string(password)
    )
}

pub fn grant_schema_sql(account: &Account, schema: &str) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON {}.* TO {}",
        grant_identifier(schema),
        account_sql(account)
    )
}

pub const FLUSH_PRIVILEGES_SQL: &str = "FLUSH PRIVILEGES";

pub fn show_grants_sql(account: &Account) -> String {
    format!("SHOW GRANTS FOR {}", account_sql(account))
}

/// Return every grant line that reaches beyond `schema`.
///
/// Accepted lines are `GRANT USAGE ON *.* ...` (the implicit no-privilege grant),
/// the database-level grant on exactly the escaped schema, and table, column or
/// routine grants on objects inside the schema. Role grants and anything that
/// cannot be parsed are reported.
pub fn excess_grants(grants: &[String], schema: &str) -> Vec<String> {
    let schema_target = format!("{}.*", grant_identifier(schema));
    let object_prefix = format!("{}.", quote_identifier(schema));

    grants
        .iter()
        .filter(|line| !is_allowed_grant(line, &schema_target, &object_prefix))
        .cloned()
        .collect()
}

fn is_allowed_grant(line: &str, schema_target: &str, object_prefix: &str) -> bool {
    let Some(rest) = line.trim().strip_prefix("GRANT ") else {
        return false;
    };
    let Some((privileges, rest)) = rest.split_once(" ON ") else {
        // `GRANT role TO user` carries whatever the role holds
        return false;
    };
    let Some((target, _account)) = rest.split_once(" TO ") else {
        return false;
    };
    let target = target.trim();
    let target = target
        .strip_prefix("PROCEDURE ")
        .or_else(|| target.strip_prefix("FUNCTION "))
        .or_else(|| target.strip_prefix("TABLE "))
        .unwrap_or(target);

    if privileges.trim() == "USAGE" && target == "*.*" {
        return true;
    }
    if target == schema_target {
        return true;
    }
    // Table-level names are literal, so the schema part is not wildcard-escaped
    target
        .strip_prefix(object_prefix)
        .is_some_and(|object| object.len() > 2 && object.starts_with('`') && object.ends_with('`'))
}
