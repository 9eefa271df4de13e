//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ChatRef, DomainError, GroupTarget, RawMessage, SinkTable};

/// Telegram API gateway. Resolve chats and senders, page through history.
#[async_trait::async_trait]
pub trait ChatGateway: Send + Sync {
    /// Resolve a chat id to a usable handle. Fails with
    /// `DomainError::Resolution` when the chat is unknown or access is
    /// denied; may signal `FloodWait`.
    async fn resolve_chat(&self, chat_id: i64) -> Result<ChatRef, DomainError>;

    /// Fetch one page of history, newest first.
    ///
    /// - `offset_date`: Unix seconds; only messages strictly older are
    ///   returned. Used to seed the first page; 0 = ignored.
    /// - `offset_id`: paginate backward from this message id; 0 = from the top.
    /// - `limit`: max messages per request.
    ///
    /// An empty page means the history is exhausted.
    async fn history_page(
        &self,
        chat: &ChatRef,
        offset_id: i32,
        offset_date: i64,
        limit: i32,
    ) -> Result<Vec<RawMessage>, DomainError>;

    /// Resolve a sender id to its username, if it has one.
    /// May signal `FloodWait`; callers decide the retry policy.
    async fn resolve_sender(&self, sender_id: i64) -> Result<Option<String>, DomainError>;
}

/// Google Sheets / Drive sink. Primitive spreadsheet operations;
/// provisioning policy lives in the use cases.
#[async_trait::async_trait]
pub trait SheetSink: Send + Sync {
    /// Probe a spreadsheet by URL/id locator. `None` when it does not exist.
    async fn open_spreadsheet(&self, locator: &str) -> Result<Option<String>, DomainError>;

    /// Create a spreadsheet inside the given Drive folder. Returns its id.
    async fn create_spreadsheet(
        &self,
        title: &str,
        folder_locator: &str,
    ) -> Result<String, DomainError>;

    /// Apply the "anyone with the link can write" sharing policy.
    async fn share_anyone_writer(&self, spreadsheet_id: &str) -> Result<(), DomainError>;

    /// Whether a worksheet with this title exists in the spreadsheet.
    async fn worksheet_exists(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<bool, DomainError>;

    /// Create a worksheet with the given grid size.
    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<(), DomainError>;

    /// Append rows after the last non-empty row of the worksheet.
    async fn append_rows(
        &self,
        table: &SinkTable,
        rows: &[Vec<String>],
    ) -> Result<(), DomainError>;
}

/// Group registry. Maps display names to chat ids and sink locators.
#[async_trait::async_trait]
pub trait RegistryPort: Send + Sync {
    /// Load all configured groups. Called once at startup.
    async fn load_groups(&self) -> Result<Vec<GroupTarget>, DomainError>;
}

/// One-way progress notifications to the caller. Must never block the job.
pub trait ProgressPort: Send + Sync {
    fn notify(&self, status: String);
}
