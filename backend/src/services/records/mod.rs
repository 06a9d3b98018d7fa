//! CRUD endpoints over the tender-activity records.
//!
//! Every route checks the session and redirects anonymous visitors to
//! `/login`. The registered routes are:
//! - `GET /`: list view with optional `search_text` / `search_date`
//!   filtering (conjunctive when both are given).
//! - `POST /add`: creates a record from the submitted form.
//! - `GET /edit/{id}` / `POST /edit/{id}`: edit form and full-field update.
//! - `GET /delete/{id}`: removes the record.
//!
//! Mutations flash a one-time outcome message and redirect back to the list
//! view; a missing id flashes "Enregistrement non trouvé" instead of
//! failing silently.

mod add;
mod delete;
mod edit;
mod list;

use actix_web::web::{self, get, post};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", get().to(list::process))
        .route("/add", post().to(add::process))
        .route("/edit/{id}", get().to(edit::page))
        .route("/edit/{id}", post().to(edit::submit))
        .route("/delete/{id}", get().to(delete::process));
}
