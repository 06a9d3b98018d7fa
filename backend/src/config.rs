//! Environment-driven configuration, loaded once at startup.
//!
//! The backend is selected by presence of `GOOGLE_SHEET_ID`: when set, the
//! spreadsheet store is used (with service-account credentials from
//! `GOOGLE_CREDENTIALS` inline JSON or a credentials file); otherwise the
//! SQLite store with `DATABASE_URL` as the database file path.

use std::env;
use std::fs;

use crate::store::sheets::ServiceAccountKey;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "suivi_ao.sqlite";
const DEFAULT_SHEET_TAB: &str = "Records";
const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub admin_username: String,
    pub admin_password: String,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone)]
pub enum BackendConfig {
    Sqlite {
        database_path: String,
    },
    Sheets {
        sheet_id: String,
        tab: String,
        credentials: ServiceAccountKey,
    },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT is not a valid port number: {raw}"))?,
            Err(_) => DEFAULT_PORT,
        };

        let backend = match env::var("GOOGLE_SHEET_ID") {
            Ok(sheet_id) => BackendConfig::Sheets {
                sheet_id,
                tab: env::var("GOOGLE_SHEET_TAB").unwrap_or_else(|_| DEFAULT_SHEET_TAB.to_string()),
                credentials: load_credentials()?,
            },
            Err(_) => BackendConfig::Sqlite {
                database_path: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            },
        };

        Ok(Self {
            host,
            port,
            secret_key: required("SECRET_KEY")?,
            admin_username: required("ADMIN_USERNAME")?,
            admin_password: required("ADMIN_PASSWORD")?,
            backend,
        })
    }
}

fn required(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{name} must be set"))
}

/// Service-account credentials: inline JSON in `GOOGLE_CREDENTIALS` (hosted
/// deployments) or a key file at `GOOGLE_CREDENTIALS_PATH` (local
/// development, default `credentials.json`).
fn load_credentials() -> Result<ServiceAccountKey, String> {
    let raw = match env::var("GOOGLE_CREDENTIALS") {
        Ok(inline) => inline,
        Err(_) => {
            let path = env::var("GOOGLE_CREDENTIALS_PATH")
                .unwrap_or_else(|_| DEFAULT_CREDENTIALS_PATH.to_string());
            fs::read_to_string(&path)
                .map_err(|e| format!("cannot read credentials file {path}: {e}"))?
        }
    };
    serde_json::from_str(&raw).map_err(|e| format!("invalid service-account credentials: {e}"))
}
