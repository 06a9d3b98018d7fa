//! Google Sheets-backed record store.
//!
//! One spreadsheet tab acts as the datastore. Column A carries an explicit,
//! persisted record id (assigned as max+1 on append) so identity survives
//! row clears and concurrent insertions instead of being derived from row
//! position. Data starts at row 2; row 1 is the header.
//!
//! Row layout: `A:id, B:date, C:nom_collab, D:titre_profil, E:support_ao,
//! F:source_ao, G:nombre_cv, H:lien_annonce, I:lien_drive`.
//!
//! Deletion clears the cell range in place, leaving a gap; rows that are
//! blank or too short are skipped when listing. Updating or deleting an id
//! that no longer resolves to a row is reported as `StoreError::NotFound`,
//! never silently ignored.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::model::record::{Record, RecordDraft};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::{StoreError, StoreResult};
use crate::store::{RecordFilter, RecordStore};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DATE_FORMAT: &str = "%Y-%m-%d";
/// First data row; row 1 holds the column headers.
const FIRST_DATA_ROW: usize = 2;
const ROW_WIDTH: usize = 9;

/// Subset of a Google service-account key file needed to sign access-token
/// requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

#[derive(Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

pub struct SheetsStore {
    client: reqwest::Client,
    sheet_id: String,
    tab: String,
    key: ServiceAccountKey,
    token: RwLock<Option<CachedToken>>,
}

impl SheetsStore {
    pub fn new(sheet_id: String, tab: String, key: ServiceAccountKey) -> Self {
        Self {
            client: reqwest::Client::new(),
            sheet_id,
            tab,
            key,
            token: RwLock::new(None),
        }
    }

    /// Returns a bearer token for the spreadsheet scope, exchanging a fresh
    /// service-account JWT when the cached one is absent or about to expire.
    async fn access_token(&self) -> StoreResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Utc::now() + Duration::seconds(60) {
                    return Ok(token.value.clone());
                }
            }
        }

        let now = Utc::now();
        let claims = TokenClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_ENDPOINT,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?,
        )?;

        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: TokenResponse = response.json().await?;

        let mut cached = self.token.write().await;
        *cached = Some(CachedToken {
            value: body.access_token.clone(),
            expires_at: now + Duration::seconds(body.expires_in),
        });
        Ok(body.access_token)
    }

    fn data_range(&self) -> String {
        format!("{}!A{}:I", self.tab, FIRST_DATA_ROW)
    }

    fn row_range(&self, row: usize) -> String {
        format!("{}!A{}:I{}", self.tab, row, row)
    }

    /// Fetches every data row as raw cells. Cleared rows come back as empty
    /// entries, so positions in the result map directly to sheet rows.
    async fn fetch_rows(&self) -> StoreResult<Vec<Vec<String>>> {
        let token = self.access_token().await?;
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{}",
            self.sheet_id,
            self.data_range()
        );
        let response = self.client.get(&url).bearer_auth(&token).send().await?;
        let response = check_status(response).await?;
        let range: ValueRange = response.json().await?;
        Ok(range.values)
    }

    /// Absolute sheet row of the record with the given id, if any.
    async fn locate_row(&self, id: i64) -> StoreResult<Option<usize>> {
        let rows = self.fetch_rows().await?;
        Ok(locate(&rows, id))
    }
}

async fn check_status(response: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Backend(format!(
        "Sheets API returned {status}: {body}"
    )))
}

/// Parses one raw row into a record. Rows that are blank, too short, or
/// carry unparseable cells are skipped by the caller (they are either
/// cleared rows or manual edits the tool cannot interpret).
fn parse_row(row: &[String]) -> Option<Record> {
    if row.len() < ROW_WIDTH {
        return None;
    }
    let id: i64 = row[0].trim().parse().ok()?;
    let date_insertion = NaiveDate::parse_from_str(row[1].trim(), DATE_FORMAT).ok()?;
    let nombre_cv: i64 = row[6].trim().parse().ok()?;

    Some(Record {
        id,
        date_insertion,
        nom_collab: row[2].clone(),
        titre_profil: row[3].clone(),
        support_ao: row[4].clone(),
        source_ao: row[5].clone(),
        nombre_cv,
        lien_annonce: row[7].clone(),
        lien_drive: row[8].clone(),
    })
}

fn serialize_row(id: i64, draft: &RecordDraft) -> Vec<String> {
    vec![
        id.to_string(),
        draft.date_insertion.format(DATE_FORMAT).to_string(),
        draft.nom_collab.clone(),
        draft.titre_profil.clone(),
        draft.support_ao.clone(),
        draft.source_ao.clone(),
        draft.nombre_cv.to_string(),
        draft.lien_annonce.clone(),
        draft.lien_drive.clone(),
    ]
}

/// Next id to assign: one past the largest id currently in the sheet.
fn next_id(rows: &[Vec<String>]) -> i64 {
    rows.iter()
        .filter_map(|row| row.first()?.trim().parse::<i64>().ok())
        .max()
        .unwrap_or(0)
        + 1
}

/// Absolute sheet row (1-based, header included) holding the given id.
fn locate(rows: &[Vec<String>], id: i64) -> Option<usize> {
    rows.iter()
        .position(|row| {
            row.first()
                .and_then(|cell| cell.trim().parse::<i64>().ok())
                == Some(id)
        })
        .map(|offset| offset + FIRST_DATA_ROW)
}

#[async_trait]
impl RecordStore for SheetsStore {
    async fn list(&self, filter: &RecordFilter) -> StoreResult<Vec<Record>> {
        let rows = self.fetch_rows().await?;
        let records = rows
            .iter()
            .filter_map(|row| {
                let parsed = parse_row(row);
                if parsed.is_none() && !row.is_empty() {
                    warn!("skipping unparseable sheet row: {row:?}");
                }
                parsed
            })
            .filter(|record| filter.matches(record))
            .collect();
        Ok(records)
    }

    async fn get(&self, id: i64) -> StoreResult<Record> {
        let rows = self.fetch_rows().await?;
        rows.iter()
            .filter_map(|row| parse_row(row))
            .find(|record| record.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    async fn add(&self, draft: &RecordDraft) -> StoreResult<()> {
        let rows = self.fetch_rows().await?;
        let id = next_id(&rows);

        let token = self.access_token().await?;
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{}!A:I:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            self.sheet_id, self.tab
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "values": [serialize_row(id, draft)] }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn update(&self, id: i64, draft: &RecordDraft) -> StoreResult<()> {
        let row = self
            .locate_row(id)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let token = self.access_token().await?;
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{}?valueInputOption=RAW",
            self.sheet_id,
            self.row_range(row)
        );
        let response = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "values": [serialize_row(id, draft)] }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let row = self
            .locate_row(id)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let token = self.access_token().await?;
        let url = format!(
            "{SHEETS_ENDPOINT}/{}/values/{}:clear",
            self.sheet_id,
            self.row_range(row)
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}
