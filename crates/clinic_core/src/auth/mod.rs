//! Operator credential table.
//!
//! # Responsibility
//! - Load the `username,digest` credential file once at startup.
//! - Answer login digest checks for the session gate.
//!
//! # Invariants
//! - The table is immutable after load.
//! - Passwords are never stored or logged; only SHA-256 hex digests are
//!   compared.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Read-only mapping from username to password digest.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    users: HashMap<String, String>,
}

/// Errors from loading the credential file.
#[derive(Debug)]
pub enum CredentialError {
    /// Credential file could not be read.
    Io(std::io::Error),
    /// A line is not a `username,digest` pair (1-based line number).
    MalformedLine(usize),
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "credential file access failed: {err}"),
            Self::MalformedLine(line) => {
                write!(f, "malformed credential entry at line {line}")
            }
        }
    }
}

impl Error for CredentialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::MalformedLine(_) => None,
        }
    }
}

impl From<std::io::Error> for CredentialError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl CredentialTable {
    /// Loads the credential file at `path`.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses line-oriented `username,digest` content.
    ///
    /// Blank lines are skipped; anything else without exactly one comma is
    /// rejected with its line number.
    pub fn parse(contents: &str) -> Result<Self, CredentialError> {
        let mut users = HashMap::new();
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((username, digest)) = line.split_once(',') else {
                return Err(CredentialError::MalformedLine(index + 1));
            };
            let username = username.trim();
            let digest = digest.trim();
            if username.is_empty() || digest.is_empty() {
                return Err(CredentialError::MalformedLine(index + 1));
            }
            users.insert(username.to_string(), digest.to_string());
        }
        Ok(Self { users })
    }

    /// Checks a username/password pair against the stored digest.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| stored == &password_digest(password))
    }
}

/// SHA-256 hex digest of a password, as stored in the credential file.
pub fn password_digest(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}
