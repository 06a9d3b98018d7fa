//! Unified store error type.
//! Both backends and the authentication gate return `StoreError` so the
//! handlers can map every failure to the same flash/redirect taxonomy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The record id does not resolve to a live row. Reported explicitly by
    /// both backends, including the spreadsheet one where the row may have
    /// been cleared by another writer between listing and mutating.
    #[error("record {0} not found")]
    NotFound(i64),

    #[error("invalid field: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Non-success response or malformed payload from the Sheets API.
    #[error("sheets backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
