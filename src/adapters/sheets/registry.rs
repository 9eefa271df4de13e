//! Group registry reader. Implements RegistryPort over the first worksheet
//! of a configured registry spreadsheet.
//!
//! Expected header: Name | ID | Sheet URL | Drive Folder URL (any column
//! order). One group per row; rows with an empty name are skipped.

use crate::adapters::sheets::locator;
use crate::domain::{DomainError, GroupTarget};
use crate::ports::RegistryPort;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Registry adapter: reads the group table once at startup.
pub struct SheetRegistry {
    http: reqwest::Client,
    token: String,
    registry_locator: String,
}

impl SheetRegistry {
    pub fn new(http: reqwest::Client, token: String, registry_locator: String) -> Self {
        Self {
            http,
            token,
            registry_locator,
        }
    }
}

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[async_trait]
impl RegistryPort for SheetRegistry {
    async fn load_groups(&self) -> Result<Vec<GroupTarget>, DomainError> {
        let id = locator::spreadsheet_id(&self.registry_locator).ok_or_else(|| {
            DomainError::Registry(format!("bad registry locator: {}", self.registry_locator))
        })?;

        let url = format!("{}/{}/values/A1:Z", SHEETS_API, id);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DomainError::Registry(format!("values.get: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::Registry(format!(
                "values.get {}: {}",
                status, text
            )));
        }

        let body: ValuesResponse = res
            .json()
            .await
            .map_err(|e| DomainError::Registry(format!("values.get response: {}", e)))?;

        let groups = parse_group_rows(&body.values)?;
        info!(count = groups.len(), "group registry loaded");
        Ok(groups)
    }
}

/// Parse the raw cell grid into group targets. First row is the header.
fn parse_group_rows(values: &[Vec<String>]) -> Result<Vec<GroupTarget>, DomainError> {
    let header = values
        .first()
        .ok_or_else(|| DomainError::Registry("registry sheet is empty".into()))?;

    let col = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| DomainError::Registry(format!("registry header misses '{}'", name)))
    };
    let name_col = col("Name")?;
    let id_col = col("ID")?;
    let sheet_col = col("Sheet URL")?;
    let folder_col = col("Drive Folder URL")?;

    let cell = |row: &[String], idx: usize| row.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

    let mut groups = Vec::new();
    for (i, row) in values.iter().enumerate().skip(1) {
        let name = cell(row, name_col);
        if name.is_empty() {
            continue;
        }
        let raw_id = cell(row, id_col);
        let chat_id: i64 = raw_id.parse().map_err(|_| {
            DomainError::Registry(format!(
                "registry row {}: bad chat id '{}' for group '{}'",
                i + 1,
                raw_id,
                name
            ))
        })?;
        groups.push(GroupTarget {
            name,
            chat_id,
            sheet_url: cell(row, sheet_col),
            drive_folder_url: cell(row, folder_col),
        });
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn parses_groups_in_header_order() {
        let values = rows(&[
            &["Name", "ID", "Sheet URL", "Drive Folder URL"],
            &[
                "Dev Team",
                "-1001234567890",
                "https://docs.google.com/spreadsheets/d/abc/edit",
                "https://drive.google.com/drive/folders/xyz",
            ],
        ]);

        let groups = parse_group_rows(&values).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Dev Team");
        assert_eq!(groups[0].chat_id, -1001234567890);
    }

    #[test]
    fn handles_reordered_columns() {
        let values = rows(&[
            &["ID", "Drive Folder URL", "Name", "Sheet URL"],
            &["42", "folder-url", "Ops", "sheet-url"],
        ]);

        let groups = parse_group_rows(&values).unwrap();
        assert_eq!(groups[0].name, "Ops");
        assert_eq!(groups[0].chat_id, 42);
        assert_eq!(groups[0].sheet_url, "sheet-url");
        assert_eq!(groups[0].drive_folder_url, "folder-url");
    }

    #[test]
    fn skips_rows_without_a_name() {
        let values = rows(&[
            &["Name", "ID", "Sheet URL", "Drive Folder URL"],
            &["", "1", "s", "f"],
            &["Real", "2", "s", "f"],
        ]);

        let groups = parse_group_rows(&values).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Real");
    }

    #[test]
    fn missing_header_column_is_an_error() {
        let values = rows(&[&["Name", "ID", "Sheet URL"], &["X", "1", "s"]]);
        assert!(matches!(
            parse_group_rows(&values),
            Err(DomainError::Registry(_))
        ));
    }

    #[test]
    fn non_numeric_chat_id_is_an_error() {
        let values = rows(&[
            &["Name", "ID", "Sheet URL", "Drive Folder URL"],
            &["X", "not-a-number", "s", "f"],
        ]);
        let err = parse_group_rows(&values).unwrap_err();
        assert!(err.to_string().contains("bad chat id"));
    }
}
