//! Persistence abstraction over the two interchangeable backends.
//!
//! `RecordStore` is the single contract the HTTP services talk to. At
//! startup exactly one implementation is constructed from configuration and
//! injected into the Actix app as `web::Data<dyn RecordStore>`:
//! - `SqliteStore`: a local SQLite file; filtering is pushed into SQL and
//!   results are ordered by insertion date descending.
//! - `SheetsStore`: a Google Sheets tab used as a flat-file datastore;
//!   every row is fetched and filtered in-process, with no ordering
//!   guarantee.

pub mod sheets;
pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::model::record::{Record, RecordDraft};

use crate::errors::StoreResult;

/// Optional list predicates. Both are conjunctive when present.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring matched against `nom_collab` OR
    /// `titre_profil`.
    pub text: Option<String>,
    /// Exact-day match on `date_insertion`.
    pub date: Option<NaiveDate>,
}

impl RecordFilter {
    /// In-process predicate used by the spreadsheet backend; the SQL
    /// backend expresses the same semantics in its WHERE clause.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !record.nom_collab.to_lowercase().contains(&needle)
                && !record.titre_profil.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(date) = self.date {
            if record.date_insertion != date {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns all records matching the filter.
    async fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<Record>>;

    /// Fetches one record by id, `StoreError::NotFound` when absent.
    async fn get(&self, id: i64) -> StoreResult<Record>;

    /// Appends one record; the backend assigns the id.
    async fn add(&self, draft: &RecordDraft) -> StoreResult<()>;

    /// Full-field replacement of the record with the given id.
    async fn update(&self, id: i64, draft: &RecordDraft) -> StoreResult<()>;

    /// Removes the record with the given id.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}
