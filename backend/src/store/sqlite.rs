//! SQLite-backed record store.
//!
//! Records live in a `records` table with an autoincrement surrogate key;
//! the single admin account lives in a `users` table managed by
//! `crate::auth::DbAuthenticator`. A connection is opened per operation
//! against the configured database file, and both list predicates are
//! pushed into the query.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::model::record::{Record, RecordDraft};
use rusqlite::{params, Connection, Row};

use crate::errors::{StoreError, StoreResult};
use crate::store::{RecordFilter, RecordStore};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn new(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let store = Self { path: path.into() };
        let conn = store.open()?;
        init_schema(&conn)?;
        Ok(store)
    }

    fn open(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.path)?)
    }
}

/// Creates the `records` and `users` tables when missing. Shared with the
/// authenticator so either entry point can bootstrap a fresh file.
pub(crate) fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_insertion TEXT NOT NULL,
            nom_collab TEXT NOT NULL,
            titre_profil TEXT NOT NULL,
            support_ao TEXT NOT NULL,
            source_ao TEXT NOT NULL,
            nombre_cv INTEGER NOT NULL,
            lien_annonce TEXT NOT NULL,
            lien_drive TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            salt TEXT NOT NULL,
            password_hash TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn map_row(row: &Row) -> rusqlite::Result<Record> {
    let date_str: String = row.get("date_insertion")?;
    let date_insertion = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(StoreError::Validation(format!(
                "invalid stored date: {date_str}"
            ))),
        )
    })?;

    Ok(Record {
        id: row.get("id")?,
        date_insertion,
        nom_collab: row.get("nom_collab")?,
        titre_profil: row.get("titre_profil")?,
        support_ao: row.get("support_ao")?,
        source_ao: row.get("source_ao")?,
        nombre_cv: row.get("nombre_cv")?,
        lien_annonce: row.get("lien_annonce")?,
        lien_drive: row.get("lien_drive")?,
    })
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<Record>> {
        let conn = self.open()?;
        let like = filter
            .text
            .as_ref()
            .map(|t| format!("%{}%", t.to_lowercase()));
        let date = filter.date.map(|d| d.format(DATE_FORMAT).to_string());

        let mut stmt = conn.prepare(
            "SELECT * FROM records
             WHERE (?1 IS NULL OR LOWER(nom_collab) LIKE ?1 OR LOWER(titre_profil) LIKE ?1)
               AND (?2 IS NULL OR date_insertion = ?2)
             ORDER BY date_insertion DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![like, date], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    async fn get(&self, id: i64) -> StoreResult<Record> {
        let conn = self.open()?;
        match conn.query_row("SELECT * FROM records WHERE id = ?1", params![id], map_row) {
            Ok(record) => Ok(record),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    async fn add(&self, draft: &RecordDraft) -> StoreResult<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO records (date_insertion, nom_collab, titre_profil, support_ao,
                                  source_ao, nombre_cv, lien_annonce, lien_drive)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.date_insertion.format(DATE_FORMAT).to_string(),
                draft.nom_collab,
                draft.titre_profil,
                draft.support_ao,
                draft.source_ao,
                draft.nombre_cv,
                draft.lien_annonce,
                draft.lien_drive,
            ],
        )?;
        Ok(())
    }

    async fn update(&self, id: i64, draft: &RecordDraft) -> StoreResult<()> {
        let conn = self.open()?;
        let changed = conn.execute(
            "UPDATE records
             SET date_insertion = ?1, nom_collab = ?2, titre_profil = ?3, support_ao = ?4,
                 source_ao = ?5, nombre_cv = ?6, lien_annonce = ?7, lien_drive = ?8
             WHERE id = ?9",
            params![
                draft.date_insertion.format(DATE_FORMAT).to_string(),
                draft.nom_collab,
                draft.titre_profil,
                draft.support_ao,
                draft.source_ao,
                draft.nombre_cv,
                draft.lien_annonce,
                draft.lien_drive,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let conn = self.open()?;
        let changed = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
