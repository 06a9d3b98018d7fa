//! Login and logout endpoints.
//!
//! `/login` is the only route reachable anonymously; everything else
//! redirects here via the session guard. The registered routes are:
//! - `GET /login`: renders the login form.
//! - `POST /login`: checks the submitted credentials against the configured
//!   `Authenticator` and opens the session on success.
//! - `GET /logout`: closes the session.

mod login;
mod logout;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", get().to(login::page))
        .route("/login", post().to(login::submit))
        .route("/logout", get().to(logout::process));
}
