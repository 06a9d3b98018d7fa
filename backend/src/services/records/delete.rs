use actix_session::Session;
use actix_web::{web, HttpResponse};
use log::error;

use crate::errors::StoreError;
use crate::session;
use crate::store::RecordStore;

/// `GET /delete/{id}`: removes the record (SQLite) or clears its row in
/// place (Sheets), then returns to the list view with an outcome flash.
pub async fn process(
    session: Session,
    store: web::Data<dyn RecordStore>,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }
    let id = path.into_inner();

    match store.delete(id).await {
        Ok(()) => {
            session::push_flash(&session, "success", "Enregistrement supprimé avec succès.")
        }
        Err(StoreError::NotFound(_)) => {
            session::push_flash(&session, "danger", "Enregistrement non trouvé.")
        }
        Err(e) => {
            error!("deleting record {id} failed: {e}");
            session::push_flash(&session, "danger", "Erreur lors de la suppression.");
        }
    }
    session::redirect("/")
}
