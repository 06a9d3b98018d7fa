use actix_session::Session;
use actix_web::{web, HttpResponse};
use common::model::record::RecordForm;
use log::error;

use crate::session;
use crate::store::RecordStore;

/// `POST /add`: coerces the form into a draft and appends it. Both
/// validation and backend failures land back on the list view with a flash
/// message.
pub async fn process(
    session: Session,
    store: web::Data<dyn RecordStore>,
    form: web::Form<RecordForm>,
) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }

    match form.into_inner().into_draft() {
        Ok(draft) => match store.add(&draft).await {
            Ok(()) => {
                session::push_flash(&session, "success", "Enregistrement ajouté avec succès.")
            }
            Err(e) => {
                error!("adding record failed: {e}");
                session::push_flash(
                    &session,
                    "danger",
                    "Erreur lors de l'ajout de l'enregistrement.",
                );
            }
        },
        Err(message) => session::push_flash(&session, "danger", &message),
    }
    session::redirect("/")
}
