//! Idempotent provisioning of the destination worksheet.
//!
//! Locates the spreadsheet by its registry locator, creating it inside the
//! group's Drive folder when missing; then locates the worksheet by group
//! name, creating it with growth headroom and the fixed header row when
//! missing. Calling ensure twice performs no second creation or header write.

use crate::domain::{DomainError, GroupTarget, SinkTable};
use crate::ports::SheetSink;
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed header row; always the first row of a provisioned worksheet.
pub const HEADER_ROW: [&str; 4] = ["Date", "User ID", "Username", "Message"];

/// Grid headroom for newly created worksheets.
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLS: u32 = 20;

pub struct SinkProvisioner {
    sink: Arc<dyn SheetSink>,
    /// Apply "anyone with the link can write" to newly created spreadsheets.
    /// Off unless explicitly configured.
    share_anyone: bool,
}

impl SinkProvisioner {
    pub fn new(sink: Arc<dyn SheetSink>, share_anyone: bool) -> Self {
        Self { sink, share_anyone }
    }

    /// Ensure the group's spreadsheet, worksheet, and header row exist.
    pub async fn ensure(&self, group: &GroupTarget) -> Result<SinkTable, DomainError> {
        let spreadsheet_id = match self.sink.open_spreadsheet(&group.sheet_url).await? {
            Some(id) => id,
            None => {
                warn!(
                    group = %group.name,
                    url = %group.sheet_url,
                    "spreadsheet not found, creating in the group's Drive folder"
                );
                let id = self
                    .sink
                    .create_spreadsheet(&group.name, &group.drive_folder_url)
                    .await?;
                if self.share_anyone {
                    self.sink.share_anyone_writer(&id).await?;
                }
                id
            }
        };

        let table = SinkTable {
            spreadsheet_id: spreadsheet_id.clone(),
            worksheet: group.name.clone(),
        };

        if self
            .sink
            .worksheet_exists(&spreadsheet_id, &group.name)
            .await?
        {
            info!(group = %group.name, "using existing worksheet");
            return Ok(table);
        }

        info!(group = %group.name, "creating worksheet");
        self.sink
            .add_worksheet(&spreadsheet_id, &group.name, NEW_SHEET_ROWS, NEW_SHEET_COLS)
            .await?;
        let header: Vec<String> = HEADER_ROW.iter().map(|s| s.to_string()).collect();
        self.sink.append_rows(&table, &[header]).await?;

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counters {
        creates: usize,
        shares: usize,
        sheets_added: usize,
        appended: Vec<Vec<Vec<String>>>,
    }

    /// In-memory sink: one optional spreadsheet with a set of worksheets.
    struct FakeSink {
        existing_spreadsheet: Option<String>,
        existing_worksheets: Mutex<Vec<String>>,
        counters: Mutex<Counters>,
    }

    impl FakeSink {
        fn with_spreadsheet(worksheets: &[&str]) -> Self {
            Self {
                existing_spreadsheet: Some("sheet-1".into()),
                existing_worksheets: Mutex::new(
                    worksheets.iter().map(|s| s.to_string()).collect(),
                ),
                counters: Mutex::new(Counters::default()),
            }
        }

        fn empty() -> Self {
            Self {
                existing_spreadsheet: None,
                existing_worksheets: Mutex::new(Vec::new()),
                counters: Mutex::new(Counters::default()),
            }
        }
    }

    #[async_trait]
    impl SheetSink for FakeSink {
        async fn open_spreadsheet(&self, _locator: &str) -> Result<Option<String>, DomainError> {
            Ok(self.existing_spreadsheet.clone())
        }

        async fn create_spreadsheet(
            &self,
            _title: &str,
            _folder_locator: &str,
        ) -> Result<String, DomainError> {
            self.counters.lock().unwrap().creates += 1;
            Ok("created-1".into())
        }

        async fn share_anyone_writer(&self, _spreadsheet_id: &str) -> Result<(), DomainError> {
            self.counters.lock().unwrap().shares += 1;
            Ok(())
        }

        async fn worksheet_exists(
            &self,
            _spreadsheet_id: &str,
            title: &str,
        ) -> Result<bool, DomainError> {
            Ok(self
                .existing_worksheets
                .lock()
                .unwrap()
                .iter()
                .any(|t| t == title))
        }

        async fn add_worksheet(
            &self,
            _spreadsheet_id: &str,
            title: &str,
            _rows: u32,
            _cols: u32,
        ) -> Result<(), DomainError> {
            self.counters.lock().unwrap().sheets_added += 1;
            self.existing_worksheets.lock().unwrap().push(title.into());
            Ok(())
        }

        async fn append_rows(
            &self,
            _table: &SinkTable,
            rows: &[Vec<String>],
        ) -> Result<(), DomainError> {
            self.counters.lock().unwrap().appended.push(rows.to_vec());
            Ok(())
        }
    }

    fn group() -> GroupTarget {
        GroupTarget {
            name: "Dev Team".into(),
            chat_id: -100123,
            sheet_url: "https://docs.google.com/spreadsheets/d/abc/edit".into(),
            drive_folder_url: "https://drive.google.com/drive/folders/xyz".into(),
        }
    }

    #[tokio::test]
    async fn creates_worksheet_and_header_when_missing() {
        let sink = Arc::new(FakeSink::with_spreadsheet(&[]));
        let provisioner = SinkProvisioner::new(Arc::clone(&sink) as Arc<dyn SheetSink>, false);

        let table = provisioner.ensure(&group()).await.unwrap();

        assert_eq!(table.spreadsheet_id, "sheet-1");
        assert_eq!(table.worksheet, "Dev Team");
        let c = sink.counters.lock().unwrap();
        assert_eq!(c.sheets_added, 1);
        assert_eq!(c.appended.len(), 1);
        assert_eq!(
            c.appended[0],
            vec![vec!["Date", "User ID", "Username", "Message"]]
        );
    }

    #[tokio::test]
    async fn second_ensure_is_a_noop() {
        let sink = Arc::new(FakeSink::with_spreadsheet(&[]));
        let provisioner = SinkProvisioner::new(Arc::clone(&sink) as Arc<dyn SheetSink>, false);

        let first = provisioner.ensure(&group()).await.unwrap();
        let second = provisioner.ensure(&group()).await.unwrap();

        assert_eq!(first, second);
        let c = sink.counters.lock().unwrap();
        assert_eq!(c.creates, 0);
        assert_eq!(c.sheets_added, 1);
        // Exactly one header write across both calls.
        assert_eq!(c.appended.len(), 1);
    }

    #[tokio::test]
    async fn missing_spreadsheet_is_created_without_sharing_by_default() {
        let sink = Arc::new(FakeSink::empty());
        let provisioner = SinkProvisioner::new(Arc::clone(&sink) as Arc<dyn SheetSink>, false);

        let table = provisioner.ensure(&group()).await.unwrap();

        assert_eq!(table.spreadsheet_id, "created-1");
        let c = sink.counters.lock().unwrap();
        assert_eq!(c.creates, 1);
        assert_eq!(c.shares, 0);
    }

    #[tokio::test]
    async fn sharing_applies_only_when_opted_in() {
        let sink = Arc::new(FakeSink::empty());
        let provisioner = SinkProvisioner::new(Arc::clone(&sink) as Arc<dyn SheetSink>, true);

        provisioner.ensure(&group()).await.unwrap();

        let c = sink.counters.lock().unwrap();
        assert_eq!(c.creates, 1);
        assert_eq!(c.shares, 1);
    }

    #[tokio::test]
    async fn existing_worksheet_keeps_its_header() {
        let sink = Arc::new(FakeSink::with_spreadsheet(&["Dev Team"]));
        let provisioner = SinkProvisioner::new(Arc::clone(&sink) as Arc<dyn SheetSink>, false);

        provisioner.ensure(&group()).await.unwrap();

        let c = sink.counters.lock().unwrap();
        assert_eq!(c.sheets_added, 0);
        assert!(c.appended.is_empty());
    }
}
