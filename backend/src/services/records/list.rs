use actix_session::Session;
use actix_web::{web, HttpResponse};
use askama::Template;
use chrono::NaiveDate;
use common::model::record::Record;
use common::model::support::SUPPORTS_AO;
use log::error;
use serde::Deserialize;

use crate::session::{self, Flash};
use crate::store::{RecordFilter, RecordStore};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    records: Vec<Record>,
    supports: Vec<String>,
    search_text: String,
    search_date: String,
    flashes: Vec<Flash>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search_text: Option<String>,
    pub search_date: Option<String>,
}

/// `GET /`: the record table, filtered by the search form when its fields
/// are non-empty. An unparseable `search_date` flashes a warning and the
/// date filter is ignored.
pub async fn process(
    session: Session,
    store: web::Data<dyn RecordStore>,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    if let Some(redirect) = session::require_login(&session) {
        return redirect;
    }

    let search_text = query.search_text.clone().unwrap_or_default();
    let search_date = query.search_date.clone().unwrap_or_default();

    let mut filter = RecordFilter::default();
    if !search_text.trim().is_empty() {
        filter.text = Some(search_text.trim().to_string());
    }
    if !search_date.trim().is_empty() {
        match NaiveDate::parse_from_str(search_date.trim(), "%Y-%m-%d") {
            Ok(date) => filter.date = Some(date),
            Err(_) => session::push_flash(&session, "danger", "Format de date invalide"),
        }
    }

    let records = match store.list(&filter).await {
        Ok(records) => records,
        Err(e) => {
            error!("listing records failed: {e}");
            session::push_flash(
                &session,
                "danger",
                "Erreur lors du chargement des enregistrements.",
            );
            Vec::new()
        }
    };

    let page = IndexTemplate {
        records,
        supports: SUPPORTS_AO.iter().map(|s| s.to_string()).collect(),
        search_text,
        search_date,
        flashes: session::take_flash(&session),
    };
    let html = page.render().unwrap_or_else(|e| format!("Template error: {e}"));
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
