use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use common::model::record::{Record, RecordForm};
use common::model::support::{is_custom_support, AUTRE, SUPPORTS_AO};
use log::error;

use crate::errors::StoreError;
use crate::session::{self, Flash};
use crate::store::RecordStore;

#[derive(Template)]
#[template(path = "edit.html")]
struct EditTemplate {
    record: Record,
    /// (value, selected) pairs for the support dropdown.
    supports: Vec<(String, bool)>,
    /// Free-text value shown when the stored support is not a predefined
    /// board.
    custom_support: String,
    flashes: Vec<Flash>,
}

/// `GET /edit/{id}`: the prefilled edit form. A stored support outside the
/// predefined list selects "Autre" and fills the free-text field.
pub async fn page(
    session: Session,
    store: web::Data<dyn RecordStore>,
    path: web::Path<i64>,
) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }
    let id = path.into_inner();

    let record = match store.get(id).await {
        Ok(record) => record,
        Err(StoreError::NotFound(_)) => {
            session::push_flash(&session, "danger", "Enregistrement non trouvé.");
            return session::redirect("/");
        }
        Err(e) => {
            error!("loading record {id} failed: {e}");
            session::push_flash(
                &session,
                "danger",
                "Erreur lors du chargement de l'enregistrement.",
            );
            return session::redirect("/");
        }
    };

    let custom = is_custom_support(&record.support_ao);
    let supports = SUPPORTS_AO
        .iter()
        .map(|s| {
            let selected = if custom {
                *s == AUTRE
            } else {
                *s == record.support_ao
            };
            (s.to_string(), selected)
        })
        .collect();
    let custom_support = if custom {
        record.support_ao.clone()
    } else {
        String::new()
    };

    let page = EditTemplate {
        record,
        supports,
        custom_support,
        flashes: session::take_flash(&session),
    };
    let html = page.render().unwrap_or_else(|e| format!("Template error: {e}"));
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// `POST /edit/{id}`: full-field replacement. A record that can no longer
/// be located (deleted or cleared meanwhile) is reported, not ignored.
pub async fn submit(
    session: Session,
    store: web::Data<dyn RecordStore>,
    path: web::Path<i64>,
    form: web::Form<RecordForm>,
) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }
    let id = path.into_inner();

    let draft = match form.into_inner().into_draft() {
        Ok(draft) => draft,
        Err(message) => {
            session::push_flash(&session, "danger", &message);
            return session::redirect(&format!("/edit/{id}"));
        }
    };

    match store.update(id, &draft).await {
        Ok(()) => {
            session::push_flash(&session, "success", "Enregistrement mis à jour avec succès.");
            session::redirect("/")
        }
        Err(StoreError::NotFound(_)) => {
            session::push_flash(&session, "danger", "Enregistrement non trouvé.");
            session::redirect("/")
        }
        Err(e) => {
            error!("updating record {id} failed: {e}");
            session::push_flash(&session, "danger", "Erreur lors de la mise à jour.");
            session::redirect(&format!("/edit/{id}"))
        }
    }
}
