use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use log::error;
use serde::Deserialize;

use crate::auth::Authenticator;
use crate::session::{self, Flash};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    flashes: Vec<Flash>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `GET /login`: an already authenticated admin is sent straight to the
/// list view.
pub async fn page(session: Session) -> HttpResponse {
    if session::is_authenticated(&session) {
        return session::redirect("/");
    }
    let page = LoginTemplate {
        flashes: session::take_flash(&session),
    };
    let html = page.render().unwrap_or_else(|e| format!("Template error: {e}"));
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// `POST /login`: a failure stays anonymous and reports the same generic
/// message whether the username or the password was wrong.
pub async fn submit(
    session: Session,
    authenticator: web::Data<dyn Authenticator>,
    form: web::Form<LoginForm>,
) -> HttpResponse {
    match authenticator.verify(&form.username, &form.password) {
        Ok(true) => {
            session::log_in(&session);
            session::push_flash(&session, "success", "Connecté avec succès.");
            session::redirect("/")
        }
        Ok(false) => {
            session::push_flash(
                &session,
                "danger",
                "Nom d'utilisateur ou mot de passe invalide.",
            );
            session::redirect("/login")
        }
        Err(e) => {
            error!("login verification failed: {e}");
            session::push_flash(&session, "danger", "Erreur lors de la connexion.");
            session::redirect("/login")
        }
    }
}
