//! Authentication gate for the single administrator account.
//!
//! Two implementations mirror the two store backends:
//! - `DbAuthenticator` (SQLite variant): verifies against a salted hash
//!   stored in the `users` table; the row is provisioned lazily at startup.
//! - `EnvAuthenticator` (Sheets variant): compares against the configured
//!   literals, nothing is persisted.
//!
//! Neither variant distinguishes "unknown user" from "wrong password" in
//! its result, so login failures cannot enumerate usernames.

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::info;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::store::sqlite::init_schema;

pub trait Authenticator: Send + Sync {
    /// True when the credentials match the administrator account.
    fn verify(&self, username: &str, password: &str) -> StoreResult<bool>;
}

/// Salted SHA-256 digest, base64-encoded.
pub(crate) fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

pub struct DbAuthenticator {
    path: PathBuf,
}

impl DbAuthenticator {
    pub fn new(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let auth = Self { path: path.into() };
        let conn = auth.open()?;
        init_schema(&conn)?;
        Ok(auth)
    }

    fn open(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    /// Inserts the admin row with a fresh salt if no user exists yet.
    /// Idempotent: an already provisioned database is left untouched.
    pub fn ensure_admin(&self, username: &str, password: &str) -> StoreResult<()> {
        let conn = self.open()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if count == 0 {
            let salt = Uuid::new_v4().simple().to_string();
            let hash = hash_password(&salt, password);
            conn.execute(
                "INSERT INTO users (username, salt, password_hash) VALUES (?1, ?2, ?3)",
                params![username, salt, hash],
            )?;
            info!("admin user '{}' provisioned", username);
        }
        Ok(())
    }
}

impl Authenticator for DbAuthenticator {
    fn verify(&self, username: &str, password: &str) -> StoreResult<bool> {
        let conn = self.open()?;
        let row: Result<(String, String), rusqlite::Error> = conn.query_row(
            "SELECT salt, password_hash FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );
        match row {
            Ok((salt, stored)) => Ok(hash_password(&salt, password) == stored),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sheets-variant gate: both fields compared against environment-provided
/// literals.
pub struct EnvAuthenticator {
    username: String,
    password: String,
}

impl EnvAuthenticator {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl Authenticator for EnvAuthenticator {
    fn verify(&self, username: &str, password: &str) -> StoreResult<bool> {
        Ok(username == self.username && password == self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_authenticator_requires_both_fields() {
        let auth = EnvAuthenticator::new("admin".to_string(), "secret".to_string());
        assert!(auth.verify("admin", "secret").unwrap());
        assert!(!auth.verify("admin", "wrong").unwrap());
        assert!(!auth.verify("other", "secret").unwrap());
    }

    #[test]
    fn hash_depends_on_salt_and_password() {
        let a = hash_password("salt1", "secret");
        assert_eq!(a, hash_password("salt1", "secret"));
        assert_ne!(a, hash_password("salt2", "secret"));
        assert_ne!(a, hash_password("salt1", "other"));
    }

    #[test]
    fn db_authenticator_provisions_once_and_verifies() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("auth.sqlite");

        let auth = DbAuthenticator::new(&path).expect("open db");
        auth.ensure_admin("admin", "secret").expect("provision");
        // Second call must not overwrite the stored credential.
        auth.ensure_admin("admin", "changed").expect("idempotent");

        assert!(auth.verify("admin", "secret").unwrap());
        assert!(!auth.verify("admin", "changed").unwrap());
        assert!(!auth.verify("admin", "wrong").unwrap());
        assert!(!auth.verify("nobody", "secret").unwrap());
    }
}
