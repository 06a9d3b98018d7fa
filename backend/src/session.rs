//! Session and flash-message helpers.
//!
//! The authenticated flag and the one-time flash messages live in the
//! signed session cookie. Flash write failures are swallowed: losing a
//! status banner must never fail the request that produced it.

use actix_session::Session;
use actix_web::http::header;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

const AUTH_KEY: &str = "authenticated";
const FLASH_KEY: &str = "flash";

/// One-time user-facing status message. `kind` matches the Bootstrap alert
/// classes used by the templates ("success" or "danger").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub kind: String,
    pub message: String,
}

pub fn is_authenticated(session: &Session) -> bool {
    session
        .get::<bool>(AUTH_KEY)
        .ok()
        .flatten()
        .unwrap_or(false)
}

pub fn log_in(session: &Session) {
    let _ = session.insert(AUTH_KEY, true);
}

pub fn log_out(session: &Session) {
    session.purge();
}

/// Queues a flash message for the next rendered page.
pub fn push_flash(session: &Session, kind: &str, message: &str) {
    let mut flashes = session
        .get::<Vec<Flash>>(FLASH_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();
    flashes.push(Flash {
        kind: kind.to_string(),
        message: message.to_string(),
    });
    let _ = session.insert(FLASH_KEY, flashes);
}

/// Drains the queued flash messages; they are shown exactly once.
pub fn take_flash(session: &Session) -> Vec<Flash> {
    let flashes = session
        .get::<Vec<Flash>>(FLASH_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();
    session.remove(FLASH_KEY);
    flashes
}

/// 303 redirect, used after every mutation and by the login guard.
pub fn redirect(path: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, path))
        .finish()
}

/// Guard applied to every route except `/login`: anonymous visitors are
/// sent to the login page instead of receiving an error.
pub fn require_login(session: &Session) -> Option<HttpResponse> {
    if is_authenticated(session) {
        None
    } else {
        Some(redirect("/login"))
    }
}
