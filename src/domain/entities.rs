//! Domain entities. Pure data structures for the core business.
//!
//! No Telegram/IO types here — these are mapped from adapters.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A Telegram chat (group or channel) resolved for one export job.
/// Read-only for the job's lifetime; the adapter keeps the underlying peer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: i64,
    pub title: String,
}

/// A raw message as yielded by history pagination, before sender resolution.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub sender_id: Option<i64>,
    pub text: String,
}

/// One fully assembled export row. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub timestamp: DateTime<Utc>,
    pub sender_id: Option<i64>,
    /// Resolved username, or "N/A" when the sender is absent or has none.
    pub sender_name: String,
    pub text: String,
}

impl MessageRecord {
    /// Render the 4-column sheet row: local time at the job offset,
    /// sender id (empty when none), username, message text.
    pub fn to_row(&self, offset: FixedOffset) -> Vec<String> {
        vec![
            self.timestamp
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            self.sender_id.map(|id| id.to_string()).unwrap_or_default(),
            self.sender_name.clone(),
            self.text.clone(),
        ]
    }
}

/// Half-open export window `[start, end)`, normalized to one fixed offset.
#[derive(Debug, Clone, Copy)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Offset used to interpret calendar dates and to render row timestamps.
    pub offset: FixedOffset,
}

impl DateWindow {
    /// Build a window from calendar dates at the given offset.
    ///
    /// `end_date` is inclusive: the window's upper bound is the following
    /// midnight, so the whole final day is covered. A missing `start_date`
    /// means "from the beginning of history" (Unix epoch; Telegram message
    /// dates are 32-bit Unix seconds, so nothing predates it).
    pub fn from_dates(
        start_date: Option<NaiveDate>,
        end_date: NaiveDate,
        offset: FixedOffset,
    ) -> Self {
        let start = match start_date {
            Some(d) => local_midnight(d, offset),
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let end = local_midnight(end_date + Duration::days(1), offset);
        Self { start, end, offset }
    }

    /// Whether `ts` falls inside `[start, end)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_local_timezone(offset).single())
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight at a fixed offset is never ambiguous or skipped.
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// One row of the group registry: where to read from and where to write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTarget {
    pub name: String,
    pub chat_id: i64,
    pub sheet_url: String,
    pub drive_folder_url: String,
}

/// The provisioned destination: a worksheet inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkTable {
    pub spreadsheet_id: String,
    pub worksheet: String,
}

/// Parameters for one end-to-end export run.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub group: GroupTarget,
    pub window: DateWindow,
}

/// Result of a completed export job.
#[derive(Debug, Default)]
pub struct ExportStats {
    pub messages_exported: usize,
    pub flushes: usize,
    /// Full-job restarts taken to get here (0 on a clean run).
    pub restarts: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn plus8() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn window_covers_whole_end_day() {
        let window = DateWindow::from_dates(
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            plus8(),
        );

        let expected_end = plus8().with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(window.end, expected_end);

        let last_second = plus8().with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap();
        assert!(window.contains(last_second.with_timezone(&Utc)));
        assert!(!window.contains(expected_end.with_timezone(&Utc)));
    }

    #[test]
    fn window_without_start_begins_at_epoch() {
        let window = DateWindow::from_dates(
            None,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            plus8(),
        );

        assert_eq!(window.start, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(
            window.end,
            plus8().with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap()
        );
        let ancient = Utc.with_ymd_and_hms(1984, 6, 1, 12, 0, 0).unwrap();
        assert!(window.contains(ancient));
    }

    #[test]
    fn record_renders_row_at_offset() {
        let record = MessageRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 9, 17, 30, 5).unwrap(),
            sender_id: Some(42),
            sender_name: "alice".into(),
            text: "hello".into(),
        };

        let row = record.to_row(plus8());
        assert_eq!(row, vec!["2024-01-10 01:30:05", "42", "alice", "hello"]);
    }

    #[test]
    fn record_without_sender_renders_empty_id() {
        let record = MessageRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 9, 1, 0, 0).unwrap(),
            sender_id: None,
            sender_name: "N/A".into(),
            text: "channel post".into(),
        };

        let row = record.to_row(plus8());
        assert_eq!(row[1], "");
        assert_eq!(row[2], "N/A");
    }
}
