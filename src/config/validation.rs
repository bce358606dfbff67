//! # Validation
//!
//! Validates identifiers before they are interpolated into DDL or sent to the
//! Kubernetes API. Each validator returns a human-readable problem on failure.

use regex::Regex;
use std::net::IpAddr;

/// Check `value` against an anchored pattern and a maximum length
fn validate_with(
    value: &str,
    field_name: &str,
    pattern: &str,
    max_len: usize,
    expected: &str,
) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{field_name} cannot be empty"));
    }
    if value.len() > max_len {
        return Err(format!(
            "{field_name} '{value}' is {} characters long, maximum is {max_len}",
            value.len()
        ));
    }
    let regex = Regex::new(pattern).map_err(|e| format!("Failed to compile regex: {e}"))?;
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(format!(
            "{field_name} '{value}' is invalid. Expected {expected}"
        ))
    }
}

/// MySQL schema name, restricted to unquoted-identifier characters
pub fn validate_schema_name(value: &str, field_name: &str) -> Result<(), String> {
    validate_with(
        value,
        field_name,
        r"^[A-Za-z0-9_$]+$",
        64,
        "letters, digits, '_' or '$'",
    )
}

/// MySQL account user part
pub fn validate_user_name(value: &str, field_name: &str) -> Result<(), String> {
    validate_with(
        value,
        field_name,
        r"^[A-Za-z0-9_.\-]+$",
        32,
        "letters, digits, '_', '.' or '-'",
    )
}

/// MySQL account host part (`%`, hostname, IP or wildcard pattern)
pub fn validate_user_host(value: &str, field_name: &str) -> Result<(), String> {
    validate_with(
        value,
        field_name,
        r"^[A-Za-z0-9_.%:\-]+$",
        255,
        "a hostname, IP address or '%' wildcard pattern",
    )
}

/// MySQL server address: an IP address (v4 or bare v6) or a DNS hostname
pub fn validate_host(value: &str, field_name: &str) -> Result<(), String> {
    if value.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    validate_with(
        value,
        field_name,
        r"^[A-Za-z0-9_]([A-Za-z0-9_\-]*[A-Za-z0-9])?(\.[A-Za-z0-9_]([A-Za-z0-9_\-]*[A-Za-z0-9])?)*\.?$",
        253,
        "a DNS hostname or IP address",
    )
}

/// Kubernetes namespace (RFC 1123 label)
pub fn validate_namespace(value: &str, field_name: &str) -> Result<(), String> {
    validate_with(
        value,
        field_name,
        r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$",
        63,
        "an RFC 1123 label (lowercase alphanumerics and '-')",
    )
}

/// Kubernetes object name (RFC 1123 subdomain)
pub fn validate_object_name(value: &str, field_name: &str) -> Result<(), String> {
    validate_with(
        value,
        field_name,
        r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$",
        253,
        "an RFC 1123 subdomain (lowercase alphanumerics, '-' and '.')",
    )
}
