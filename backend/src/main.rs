use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use sha2::{Digest, Sha256};

use backend::auth::{Authenticator, DbAuthenticator, EnvAuthenticator};
use backend::config::{AppConfig, BackendConfig};
use backend::services;
use backend::store::sheets::SheetsStore;
use backend::store::sqlite::SqliteStore;
use backend::store::RecordStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    // Stretch SECRET_KEY to the 32 bytes the cookie key derivation requires.
    let secret_digest = Sha256::digest(config.secret_key.as_bytes());
    let key = Key::derive_from(secret_digest.as_slice());

    let (store, authenticator): (Arc<dyn RecordStore>, Arc<dyn Authenticator>) =
        match &config.backend {
            BackendConfig::Sqlite { database_path } => {
                info!("using SQLite backend at {}", database_path);
                let store = SqliteStore::new(database_path)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                let auth = DbAuthenticator::new(database_path)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                auth.ensure_admin(&config.admin_username, &config.admin_password)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                (Arc::new(store), Arc::new(auth))
            }
            BackendConfig::Sheets {
                sheet_id,
                tab,
                credentials,
            } => {
                info!("using Google Sheets backend, spreadsheet {}", sheet_id);
                let store = SheetsStore::new(sheet_id.clone(), tab.clone(), credentials.clone());
                let auth = EnvAuthenticator::new(
                    config.admin_username.clone(),
                    config.admin_password.clone(),
                );
                (Arc::new(store), Arc::new(auth))
            }
        };

    let store_data: web::Data<dyn RecordStore> = web::Data::from(store);
    let auth_data: web::Data<dyn Authenticator> = web::Data::from(authenticator);

    info!("Server running at http://{}:{}", config.host, config.port);

    let bind_addr = (config.host.clone(), config.port);
    HttpServer::new(move || {
        // Internal tool served over plain HTTP, so the cookie is not
        // marked secure.
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_secure(false)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        App::new()
            .app_data(store_data.clone())
            .app_data(auth_data.clone())
            .wrap(session)
            .configure(services::auth::configure_routes)
            .configure(services::records::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
