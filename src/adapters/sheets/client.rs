//! Implements SheetSink against the Google Sheets and Drive REST APIs.
//!
//! Plain reqwest + serde_json; authenticates with a pre-issued OAuth bearer
//! token (credential bootstrap happens outside this program). Spreadsheet
//! creation goes through the Drive files endpoint so the file lands in the
//! group's folder; everything else is the Sheets v4 surface.

use crate::adapters::sheets::locator;
use crate::domain::{DomainError, SinkTable};
use crate::ports::SheetSink;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use tracing::{debug, info};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_API: &str = "https://www.googleapis.com/drive/v3/files";

/// Google Sheets/Drive adapter. One instance per process, cheap to share.
pub struct SheetsApiSink {
    http: reqwest::Client,
    token: String,
}

impl SheetsApiSink {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self { http, token }
    }

    /// A1 range addressing the whole worksheet, quoted for names with spaces.
    fn worksheet_range(worksheet: &str) -> String {
        format!("'{}'!A1", worksheet.replace('\'', "''"))
    }

    async fn error_body(res: reqwest::Response) -> String {
        let status = res.status();
        let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
        format!("{}: {}", status, text)
    }
}

#[async_trait]
impl SheetSink for SheetsApiSink {
    async fn open_spreadsheet(&self, locator: &str) -> Result<Option<String>, DomainError> {
        let id = locator::spreadsheet_id(locator)
            .ok_or_else(|| DomainError::Provision(format!("bad spreadsheet locator: {}", locator)))?;

        let url = format!("{}/{}?fields=spreadsheetId", SHEETS_API, id);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DomainError::Provision(format!("spreadsheets.get: {}", e)))?;

        match res.status() {
            StatusCode::OK => Ok(Some(id)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(DomainError::Provision(format!(
                "spreadsheets.get {}",
                Self::error_body(res).await
            ))),
        }
    }

    async fn create_spreadsheet(
        &self,
        title: &str,
        folder_locator: &str,
    ) -> Result<String, DomainError> {
        let folder = locator::folder_id(folder_locator).ok_or_else(|| {
            DomainError::Provision(format!("bad Drive folder locator: {}", folder_locator))
        })?;

        let body = json!({
            "name": title,
            "mimeType": "application/vnd.google-apps.spreadsheet",
            "parents": [folder],
        });
        let res = self
            .http
            .post(DRIVE_API)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Provision(format!("files.create: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Provision(format!(
                "files.create {}",
                Self::error_body(res).await
            )));
        }

        let created: serde_json::Value = res
            .json()
            .await
            .map_err(|e| DomainError::Provision(format!("files.create response: {}", e)))?;
        let id = created["id"]
            .as_str()
            .ok_or_else(|| DomainError::Provision("files.create returned no id".into()))?
            .to_string();

        info!(spreadsheet_id = %id, title, "spreadsheet created");
        Ok(id)
    }

    async fn share_anyone_writer(&self, spreadsheet_id: &str) -> Result<(), DomainError> {
        let url = format!("{}/{}/permissions", DRIVE_API, spreadsheet_id);
        let body = json!({ "role": "writer", "type": "anyone" });
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Provision(format!("permissions.create: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Provision(format!(
                "permissions.create {}",
                Self::error_body(res).await
            )));
        }
        info!(spreadsheet_id, "spreadsheet shared: anyone with the link can write");
        Ok(())
    }

    async fn worksheet_exists(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<bool, DomainError> {
        let url = format!("{}/{}?fields=sheets.properties.title", SHEETS_API, spreadsheet_id);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DomainError::Provision(format!("spreadsheets.get: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Provision(format!(
                "spreadsheets.get {}",
                Self::error_body(res).await
            )));
        }

        let meta: serde_json::Value = res
            .json()
            .await
            .map_err(|e| DomainError::Provision(format!("spreadsheets.get response: {}", e)))?;
        let exists = meta["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .any(|s| s["properties"]["title"].as_str() == Some(title))
            })
            .unwrap_or(false);
        Ok(exists)
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), DomainError> {
        let url = format!("{}/{}:batchUpdate", SHEETS_API, spreadsheet_id);
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": rows, "columnCount": cols },
                    }
                }
            }]
        });
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Provision(format!("addSheet: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Provision(format!(
                "addSheet {}",
                Self::error_body(res).await
            )));
        }
        Ok(())
    }

    async fn append_rows(
        &self,
        table: &SinkTable,
        rows: &[Vec<String>],
    ) -> Result<(), DomainError> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
            SHEETS_API,
            table.spreadsheet_id,
            Self::worksheet_range(&table.worksheet)
        );
        let body = json!({ "values": rows });
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Sink(format!("values.append: {}", e)))?;

        if !res.status().is_success() {
            return Err(DomainError::Sink(format!(
                "values.append {}",
                Self::error_body(res).await
            )));
        }
        debug!(
            rows = rows.len(),
            worksheet = %table.worksheet,
            "rows appended"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worksheet_range_quotes_names() {
        assert_eq!(SheetsApiSink::worksheet_range("Dev Team"), "'Dev Team'!A1");
        assert_eq!(
            SheetsApiSink::worksheet_range("it's ops"),
            "'it''s ops'!A1"
        );
    }
}
