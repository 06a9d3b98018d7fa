use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::support::resolve_support;

/// One appel d'offres activity line: who submitted which profile, through
/// which board, and how many CVs went out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub date_insertion: NaiveDate,
    pub nom_collab: String,
    pub titre_profil: String,
    pub support_ao: String,
    pub source_ao: String,
    pub nombre_cv: i64,
    pub lien_annonce: String,
    pub lien_drive: String,
}

/// A record without identity, as produced by form coercion. The store
/// assigns the id on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub date_insertion: NaiveDate,
    pub nom_collab: String,
    pub titre_profil: String,
    pub support_ao: String,
    pub source_ao: String,
    pub nombre_cv: i64,
    pub lien_annonce: String,
    pub lien_drive: String,
}

/// Raw form submission for add/edit. Every field arrives as a string; the
/// date and the CV count are coerced in `into_draft`.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordForm {
    pub date_insertion: String,
    pub nom_collab: String,
    pub titre_profil: String,
    pub support_ao: String,
    #[serde(default)]
    pub autre_support: String,
    pub source_ao: String,
    pub nombre_cv: String,
    pub lien_annonce: String,
    pub lien_drive: String,
}

impl RecordForm {
    /// Coerces the raw form fields into a typed draft.
    ///
    /// Fails with a user-facing message on a malformed date, a non-integer
    /// CV count, or a negative CV count. When `support_ao` is "Autre", the
    /// stored value is the contents of `autre_support`.
    pub fn into_draft(self) -> Result<RecordDraft, String> {
        let date_insertion = NaiveDate::parse_from_str(self.date_insertion.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Format de date invalide: {}", self.date_insertion))?;

        let nombre_cv: i64 = self
            .nombre_cv
            .trim()
            .parse()
            .map_err(|_| format!("Nombre de CV invalide: {}", self.nombre_cv))?;
        if nombre_cv < 0 {
            return Err("Le nombre de CV ne peut pas être négatif".to_string());
        }

        let support_ao = resolve_support(&self.support_ao, &self.autre_support);

        Ok(RecordDraft {
            date_insertion,
            nom_collab: self.nom_collab,
            titre_profil: self.titre_profil,
            support_ao,
            source_ao: self.source_ao,
            nombre_cv,
            lien_annonce: self.lien_annonce,
            lien_drive: self.lien_drive,
        })
    }
}
