use actix_session::Session;
use actix_web::HttpResponse;

use crate::session;

/// `GET /logout`: invalidates the session and returns to the login page.
pub async fn process(session: Session) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }
    session::log_out(&session);
    session::push_flash(&session, "success", "Déconnecté avec succès.");
    session::redirect("/login")
}
