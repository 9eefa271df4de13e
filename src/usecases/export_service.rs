//! Main export logic: resolve chat -> page history -> resolve senders ->
//! batch rows -> flush to the sheet, with a job-level restart loop.
//!
//! - Batches flush at a fixed threshold, followed by a politeness pause
//! - The remainder is drained unconditionally at the end (no trailing pause)
//! - A FloodWait that escapes the pipeline restarts the whole job from
//!   scratch after the signaled wait; rows flushed before the restart are
//!   appended again (the sink has no idempotency key)
//! - Every other error is terminal: logged, notified, no rollback

use crate::domain::{DomainError, ExportJob, ExportStats, MessageRecord, SinkTable};
use crate::ports::{ChatGateway, ProgressPort, SheetSink};
use crate::usecases::history_pager::HistoryPager;
use crate::usecases::provisioner::SinkProvisioner;
use crate::usecases::sender_resolver::SenderResolver;
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Rows accumulated before a flush.
pub const FLUSH_THRESHOLD: usize = 1000;

/// Pause after each threshold flush. The only explicit backpressure control
/// against undetected sink-side rate limiting.
pub const FLUSH_PAUSE: Duration = Duration::from_secs(5);

/// Export service. Runs one chat/date-window job end to end.
pub struct ExportService {
    tg: Arc<dyn ChatGateway>,
    sink: Arc<dyn SheetSink>,
    provisioner: SinkProvisioner,
    progress: Arc<dyn ProgressPort>,
}

impl ExportService {
    pub fn new(
        tg: Arc<dyn ChatGateway>,
        sink: Arc<dyn SheetSink>,
        provisioner: SinkProvisioner,
        progress: Arc<dyn ProgressPort>,
    ) -> Self {
        Self {
            tg,
            sink,
            provisioner,
            progress,
        }
    }

    /// Run the job to completion, restarting from scratch on job-level
    /// FloodWait. Restarts are unbounded but each attempt is logged.
    pub async fn run(&self, job: &ExportJob) -> Result<ExportStats, DomainError> {
        let mut restarts = 0u32;
        loop {
            match self.run_attempt(job).await {
                Ok(mut stats) => {
                    stats.restarts = restarts;
                    info!(
                        group = %job.group.name,
                        count = stats.messages_exported,
                        flushes = stats.flushes,
                        restarts,
                        "export complete"
                    );
                    self.progress.notify(format!(
                        "All messages saved to Google Sheets for group: {}!",
                        job.group.name
                    ));
                    return Ok(stats);
                }
                Err(DomainError::FloodWait { seconds }) => {
                    restarts += 1;
                    warn!(
                        group = %job.group.name,
                        attempt = restarts,
                        wait_secs = seconds,
                        "FloodWait reached job level; restarting from scratch"
                    );
                    tokio::time::sleep(Duration::from_secs(seconds)).await;
                }
                Err(e) => {
                    error!(group = %job.group.name, error = %e, "export failed");
                    self.progress.notify(format!(
                        "Export failed for group {}: {}",
                        job.group.name, e
                    ));
                    return Err(e);
                }
            }
        }
    }

    /// One full pass: fresh pager, fresh sender cache, empty batch.
    async fn run_attempt(&self, job: &ExportJob) -> Result<ExportStats, DomainError> {
        info!(group = %job.group.name, "fetching messages");

        let chat = self.tg.resolve_chat(job.group.chat_id).await?;
        info!(chat_id = chat.id, title = %chat.title, "resolved chat");

        let table = self.provisioner.ensure(&job.group).await?;

        let mut pager = HistoryPager::new(Arc::clone(&self.tg), chat, job.window);
        let mut senders = SenderResolver::new(Arc::clone(&self.tg));
        let mut batch: Vec<MessageRecord> = Vec::with_capacity(FLUSH_THRESHOLD);
        let mut total_fetched = 0usize;
        let mut flushes = 0usize;

        while let Some(msg) = pager.next().await? {
            let sender_name = senders.resolve(msg.sender_id).await?;
            batch.push(MessageRecord {
                timestamp: msg.timestamp,
                sender_id: msg.sender_id,
                sender_name,
                text: msg.text,
            });
            total_fetched += 1;

            if batch.len() >= FLUSH_THRESHOLD {
                self.flush(&table, &mut batch, job.window.offset).await?;
                flushes += 1;
                self.progress.notify(format!(
                    "Fetched {} messages. Waiting for {} seconds...",
                    total_fetched,
                    FLUSH_PAUSE.as_secs()
                ));
                tokio::time::sleep(FLUSH_PAUSE).await;
            }
        }

        // Drain the remainder: no minimum size, no trailing pause.
        if !batch.is_empty() {
            self.flush(&table, &mut batch, job.window.offset).await?;
            flushes += 1;
        }

        Ok(ExportStats {
            messages_exported: total_fetched,
            flushes,
            restarts: 0,
        })
    }

    /// Append the whole batch as one call, then clear it.
    async fn flush(
        &self,
        table: &SinkTable,
        batch: &mut Vec<MessageRecord>,
        offset: FixedOffset,
    ) -> Result<(), DomainError> {
        let rows: Vec<Vec<String>> = batch.iter().map(|r| r.to_row(offset)).collect();
        self.sink.append_rows(table, &rows).await?;
        info!(rows = rows.len(), worksheet = %table.worksheet, "batch flushed");
        batch.clear();
        Ok(())
    }
}
