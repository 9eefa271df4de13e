//! Lazy reverse-chronological history traversal bounded by a date window.
//!
//! Pulls pages on demand (suspending at each network fetch) and stops as soon
//! as one message falls below the window start: the platform returns history
//! in strictly descending time order, so everything after it is older too.

use crate::domain::{ChatRef, DateWindow, DomainError, RawMessage};
use crate::ports::ChatGateway;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Messages per history request.
pub const PAGE_LIMIT: i32 = 100;

/// Pull-based pager over one chat's history, newest first.
///
/// Seeded from the window's exclusive upper bound (`offset_date`); later
/// pages continue from the oldest message id seen so far. Not restartable:
/// a job restart builds a fresh pager from the same upper bound.
pub struct HistoryPager {
    gateway: Arc<dyn ChatGateway>,
    chat: ChatRef,
    window: DateWindow,
    page_limit: i32,
    buffer: VecDeque<RawMessage>,
    /// Oldest message id fetched so far; cursor for the next page. 0 = none yet.
    offset_id: i32,
    exhausted: bool,
}

impl HistoryPager {
    pub fn new(gateway: Arc<dyn ChatGateway>, chat: ChatRef, window: DateWindow) -> Self {
        Self {
            gateway,
            chat,
            window,
            page_limit: PAGE_LIMIT,
            buffer: VecDeque::new(),
            offset_id: 0,
            exhausted: false,
        }
    }

    #[cfg(test)]
    fn with_page_limit(mut self, limit: i32) -> Self {
        self.page_limit = limit;
        self
    }

    /// Next in-window message, or `None` once the window (or the history)
    /// is exhausted. Each page fetch is a suspension point.
    pub async fn next(&mut self) -> Result<Option<RawMessage>, DomainError> {
        loop {
            while let Some(msg) = self.buffer.pop_front() {
                if msg.timestamp >= self.window.end {
                    // Only possible on the seed boundary page.
                    continue;
                }
                if msg.timestamp < self.window.start {
                    // Strictly descending order: everything further back is
                    // older still, so stop fetching altogether.
                    debug!(
                        chat_id = self.chat.id,
                        msg_id = msg.id,
                        "message predates window start, stopping pagination"
                    );
                    self.buffer.clear();
                    self.exhausted = true;
                    return Ok(None);
                }
                return Ok(Some(msg));
            }

            if self.exhausted {
                return Ok(None);
            }

            // First page is keyed by the window's upper bound; afterwards the
            // oldest seen id drives pagination.
            let offset_date = if self.offset_id == 0 {
                self.window.end.timestamp()
            } else {
                0
            };
            let page = self
                .gateway
                .history_page(&self.chat, self.offset_id, offset_date, self.page_limit)
                .await?;

            match page.last() {
                Some(oldest) => self.offset_id = oldest.id,
                None => {
                    self.exhausted = true;
                    return Ok(None);
                }
            }
            self.buffer.extend(page);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatRef;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
    use std::sync::Mutex;

    /// Gateway over a fixed, newest-first message history.
    struct FakeGateway {
        history: Vec<RawMessage>,
        pages_fetched: Mutex<usize>,
    }

    impl FakeGateway {
        fn new(history: Vec<RawMessage>) -> Self {
            Self {
                history,
                pages_fetched: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatGateway for FakeGateway {
        async fn resolve_chat(&self, chat_id: i64) -> Result<ChatRef, DomainError> {
            Ok(ChatRef {
                id: chat_id,
                title: "test".into(),
            })
        }

        async fn history_page(
            &self,
            _chat: &ChatRef,
            offset_id: i32,
            offset_date: i64,
            limit: i32,
        ) -> Result<Vec<RawMessage>, DomainError> {
            *self.pages_fetched.lock().unwrap() += 1;
            let page: Vec<RawMessage> = self
                .history
                .iter()
                .filter(|m| offset_id == 0 || m.id < offset_id)
                // Second-granular cursor: a message at exactly offset_date can
                // come back on the seed page, as on the real platform.
                .filter(|m| {
                    offset_id != 0 || offset_date == 0 || m.timestamp.timestamp() <= offset_date
                })
                .take(limit as usize)
                .cloned()
                .collect();
            Ok(page)
        }

        async fn resolve_sender(&self, _sender_id: i64) -> Result<Option<String>, DomainError> {
            Ok(None)
        }
    }

    fn chat() -> ChatRef {
        ChatRef {
            id: 7,
            title: "test".into(),
        }
    }

    fn plus8() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    /// `count` messages one minute apart, newest first, ending at `newest`.
    fn history(newest: DateTime<Utc>, count: i32) -> Vec<RawMessage> {
        (0..count)
            .map(|i| RawMessage {
                id: count - i,
                timestamp: newest - Duration::minutes(i64::from(i)),
                sender_id: Some(1),
                text: format!("msg {}", count - i),
            })
            .collect()
    }

    async fn drain(pager: &mut HistoryPager) -> Vec<RawMessage> {
        let mut out = Vec::new();
        while let Some(m) = pager.next().await.unwrap() {
            out.push(m);
        }
        out
    }

    #[tokio::test]
    async fn yields_only_messages_inside_window() {
        let newest = Utc.with_ymd_and_hms(2024, 1, 12, 10, 0, 0).unwrap();
        let gateway = Arc::new(FakeGateway::new(history(newest, 200)));
        let window = DateWindow::from_dates(
            Some(NaiveDate::from_ymd_opt(2024, 1, 12).unwrap()),
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            plus8(),
        );

        let mut pager = HistoryPager::new(gateway, chat(), window).with_page_limit(50);
        let yielded = drain(&mut pager).await;

        assert!(!yielded.is_empty());
        for m in &yielded {
            assert!(window.contains(m.timestamp), "out of window: {:?}", m);
        }
    }

    #[tokio::test]
    async fn stops_fetching_once_below_window_start() {
        let newest = Utc.with_ymd_and_hms(2024, 1, 12, 0, 30, 0).unwrap();
        // 300 messages spanning back several hours; window covers only the
        // newest few, so most pages must never be requested.
        let gateway = Arc::new(FakeGateway::new(history(newest, 300)));
        let window = DateWindow {
            start: newest - Duration::minutes(20),
            end: newest + Duration::minutes(1),
            offset: plus8(),
        };

        let mut pager = HistoryPager::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>, chat(), window).with_page_limit(25);
        let yielded = drain(&mut pager).await;

        assert_eq!(yielded.len(), 21);
        // 21 in-window messages fit in the first 25-message page.
        assert_eq!(*gateway.pages_fetched.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn exhausts_entire_history_for_open_start() {
        let newest = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let gateway = Arc::new(FakeGateway::new(history(newest, 120)));
        let window = DateWindow::from_dates(
            None,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            plus8(),
        );

        let mut pager = HistoryPager::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>, chat(), window).with_page_limit(50);
        let yielded = drain(&mut pager).await;

        assert_eq!(yielded.len(), 120);
        // 120 messages at 50 per page, plus the final empty probe.
        assert_eq!(*gateway.pages_fetched.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn yields_no_duplicate_ids() {
        let newest = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let gateway = Arc::new(FakeGateway::new(history(newest, 173)));
        let window = DateWindow::from_dates(
            None,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            plus8(),
        );

        let mut pager = HistoryPager::new(gateway, chat(), window).with_page_limit(40);
        let yielded = drain(&mut pager).await;

        let mut ids: Vec<i32> = yielded.iter().map(|m| m.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(total, 173);
    }

    #[tokio::test]
    async fn skips_seed_boundary_messages_at_or_after_end() {
        let end = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap();
        // One message exactly at the exclusive bound, one just inside.
        let history = vec![
            RawMessage {
                id: 2,
                timestamp: end,
                sender_id: Some(1),
                text: "at bound".into(),
            },
            RawMessage {
                id: 1,
                timestamp: end - Duration::seconds(1),
                sender_id: Some(1),
                text: "inside".into(),
            },
        ];
        let gateway = Arc::new(FakeGateway::new(history));
        let window = DateWindow {
            start: end - Duration::days(1),
            end,
            offset: plus8(),
        };

        let mut pager = HistoryPager::new(gateway, chat(), window);
        let yielded = drain(&mut pager).await;

        assert_eq!(yielded.len(), 1);
        assert_eq!(yielded[0].id, 1);
    }

    #[tokio::test]
    async fn propagates_gateway_errors() {
        struct FailingGateway;

        #[async_trait]
        impl ChatGateway for FailingGateway {
            async fn resolve_chat(&self, _chat_id: i64) -> Result<ChatRef, DomainError> {
                unreachable!()
            }
            async fn history_page(
                &self,
                _chat: &ChatRef,
                _offset_id: i32,
                _offset_date: i64,
                _limit: i32,
            ) -> Result<Vec<RawMessage>, DomainError> {
                Err(DomainError::FloodWait { seconds: 30 })
            }
            async fn resolve_sender(&self, _sender_id: i64) -> Result<Option<String>, DomainError> {
                unreachable!()
            }
        }

        let window = DateWindow::from_dates(
            None,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            plus8(),
        );
        let mut pager = HistoryPager::new(Arc::new(FailingGateway), chat(), window);

        match pager.next().await {
            Err(DomainError::FloodWait { seconds }) => assert_eq!(seconds, 30),
            other => panic!("expected FloodWait, got {:?}", other.map(|_| ())),
        }
    }
}
