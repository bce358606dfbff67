//! # Credential Generation
//!
//! Generates the provisioned user's password from the operating system CSPRNG.
//!
//! Passwords are drawn uniformly from `A-Z a-z 0-9 !@#$%^&*` and must contain at
//! least one character of each class. Candidates that miss a class are discarded
//! and regenerated rather than patched, so every accepted password is uniform
//! over the policy-satisfying set.

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng};
use std::fmt;
use zeroize::Zeroizing;

use crate::constants::MIN_PASSWORD_LENGTH;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*";

/// Credentials for one provisioning run. Never persisted locally.
pub struct GeneratedCredential {
    username: String,
    password: Zeroizing<String>,
    schema: String,
}

impl GeneratedCredential {
    /// Generate a fresh password for `username` scoped to `schema`
    pub fn generate(username: &str, schema: &str, length: usize) -> Self {
        Self {
            username: username.to_string(),
            password: generate_password(length),
            schema: schema.to_string(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

impl fmt::Debug for GeneratedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Generate a password of `length` characters (never shorter than the minimum)
pub fn generate_password(length: usize) -> Zeroizing<String> {
    generate_password_with(&mut OsRng, length)
}

fn generate_password_with<R>(rng: &mut R, length: usize) -> Zeroizing<String>
where
    R: Rng + CryptoRng,
{
    let length = length.max(MIN_PASSWORD_LENGTH);
    let alphabet: Vec<u8> = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS].concat();

    loop {
        // Capacity is fixed up front so pushes never reallocate and leave copies behind
        let mut candidate = Zeroizing::new(String::with_capacity(length));
        for _ in 0..length {
            let index = rng.gen_range(0..alphabet.len());
            candidate.push(char::from(alphabet[index]));
        }
        if meets_policy(&candidate, length) {
            return candidate;
        }
    }
}

/// Length and character-class policy check
pub fn meets_policy(password: &str, min_length: usize) -> bool {
    let bytes = password.as_bytes();
    bytes.len() >= min_length
        && bytes.iter().any(|b| LOWERCASE.contains(b))
        && bytes.iter().any(|b| UPPERCASE.contains(b))
        && bytes.iter().any(|b| DIGITS.contains(b))
        && bytes.iter().any(|b| SYMBOLS.contains(b))
        && bytes
            .iter()
            .all(|b| LOWERCASE.contains(b) || UPPERCASE.contains(b) || DIGITS.contains(b) || SYMBOLS.contains(b))
}
