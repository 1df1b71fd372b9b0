/// Google Sheets values API source
///
/// Reads a worksheet range with an API key:
/// `GET {api_url}/v4/spreadsheets/{sheet_id}/values/{range}?key=..`
///
/// The sheet must be shared for key access; OAuth service accounts are not
/// supported.
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::RawRow,
    services::sources::{rows_from_values, RecordSource},
};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct GoogleSheetsSource {
    http_client: HttpClient,
    api_url: String,
    api_key: String,
    sheet_id: String,
    range: String,
}

impl GoogleSheetsSource {
    pub fn new(api_url: String, api_key: String, sheet_id: String, range: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            api_key,
            sheet_id,
            range,
        }
    }

    fn values_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_url.trim_end_matches('/'),
            self.sheet_id,
            self.range
        )
    }
}

#[async_trait::async_trait]
impl RecordSource for GoogleSheetsSource {
    async fn fetch_rows(&self) -> AppResult<Vec<RawRow>> {
        let response = self
            .http_client
            .get(self.values_url())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Sheets API returned status {}: {}",
                status, body
            )));
        }

        let range: ValueRange = response.json().await?;
        let rows = rows_from_values(range.values);

        tracing::info!(
            sheet_id = %self.sheet_id,
            range = %self.range,
            rows = rows.len(),
            "Fetched reading log from Google Sheets"
        );

        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "google_sheets"
    }
}
