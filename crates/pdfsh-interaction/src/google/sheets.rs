use async_trait::async_trait;
use pdfsh_core::cloud::SpreadsheetExport;
use pdfsh_core::error::CloudError;
use reqwest::Client;
use serde::Serialize;

use super::{check, transport_error};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const APPEND_RANGE: &str = "A1";

/// Google Sheets v4 client.
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    access_token: String,
    api_base: String,
}

impl GoogleSheetsClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            api_base: API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn append_url(&self, sheet_id: &str) -> String {
        format!("{}/{}/values/{}:append", self.api_base, sheet_id, APPEND_RANGE)
    }
}

#[derive(Serialize)]
struct ValueRange {
    values: Vec<Vec<String>>,
}

#[async_trait]
impl SpreadsheetExport for GoogleSheetsClient {
    async fn append_rows(&self, sheet_id: &str, rows: Vec<Vec<String>>) -> Result<(), CloudError> {
        let count = rows.len();
        let response = self
            .client
            .post(self.append_url(sheet_id))
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueRange { values: rows })
            .send()
            .await
            .map_err(transport_error)?;
        check(response).await?;

        tracing::info!("[GoogleSheets] Appended {} rows to {}", count, sheet_id);
        Ok(())
    }
}
