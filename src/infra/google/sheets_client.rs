// =============================================================================
// GOOGLE SHEETS CLIENT
// =============================================================================
//
// Reads and writes cell values through the `spreadsheets.values` endpoints.
// Ranges are A1 strings and are sent as a single path segment so sheet names
// with spaces or `!` survive encoding.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;

use super::http::{send, send_json};
use crate::core::auth::Credential;
use crate::core::editing::ApiError;
use crate::core::sheets::{CellValue, SheetsApi, ValueRender};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    /// Omitted entirely when the range is empty.
    values: Option<Vec<Vec<CellValue>>>,
}

fn render_option(render: ValueRender) -> &'static str {
    match render {
        ValueRender::Formatted => "FORMATTED_VALUE",
        ValueRender::Formula => "FORMULA",
    }
}

pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: SHEETS_API_BASE.to_string(),
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Transport(format!("invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }
}

impl Default for GoogleSheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SheetsApi for GoogleSheetsClient {
    async fn get_values(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRender,
    ) -> Result<Vec<Vec<CellValue>>, ApiError> {
        tracing::debug!(spreadsheet_id, range, "Fetching sheet values");

        let request = self
            .client
            .get(self.values_url(spreadsheet_id, range)?)
            .query(&[("valueRenderOption", render_option(render))])
            .header("Authorization", credential.bearer());
        let value_range: ValueRange = send_json(request).await?;
        Ok(value_range.values.unwrap_or_default())
    }

    async fn update_values(
        &self,
        credential: &Credential,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<CellValue>],
    ) -> Result<(), ApiError> {
        let request = self
            .client
            .put(self.values_url(spreadsheet_id, range)?)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .header("Authorization", credential.bearer())
            .json(&json!({ "majorDimension": "ROWS", "values": values }));
        send(request).await
    }
}
