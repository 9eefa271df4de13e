//! Implements InputPort. Inquire-based interactive prompts.
//!
//! Select a group from the registry, pick a date mode, confirm, then run the
//! export on its own task while this loop renders progress. The job task
//! never waits on the prompt side.

use crate::domain::{DateWindow, DomainError, ExportJob, GroupTarget};
use crate::ports::{InputPort, RegistryPort};
use crate::usecases::ExportService;
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, DateSelect, Select};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

const MODE_ALL: &str = "All history";
const MODE_TODAY: &str = "Today only";
const MODE_RANGE: &str = "Custom date range";

/// Prompt adapter. Owns the receiving end of the progress channel.
pub struct PromptInputPort {
    registry: Arc<dyn RegistryPort>,
    export: Arc<ExportService>,
    progress_rx: Mutex<mpsc::UnboundedReceiver<String>>,
    offset: FixedOffset,
}

impl PromptInputPort {
    pub fn new(
        registry: Arc<dyn RegistryPort>,
        export: Arc<ExportService>,
        progress_rx: mpsc::UnboundedReceiver<String>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            registry,
            export,
            progress_rx: Mutex::new(progress_rx),
            offset,
        }
    }

    fn pick_dates(&self) -> Result<Option<(Option<NaiveDate>, NaiveDate)>, DomainError> {
        let today = Utc::now().with_timezone(&self.offset).date_naive();
        let mode = Select::new("Date range:", vec![MODE_ALL, MODE_TODAY, MODE_RANGE])
            .prompt()
            .map_err(|e| DomainError::Input(e.to_string()))?;

        let dates = match mode {
            MODE_ALL => (None, today),
            MODE_TODAY => (Some(today), today),
            _ => {
                let start = DateSelect::new("Start date:")
                    .with_default(today)
                    .prompt()
                    .map_err(|e| DomainError::Input(e.to_string()))?;
                let end = DateSelect::new("End date:")
                    .with_default(today)
                    .with_min_date(start)
                    .prompt()
                    .map_err(|e| DomainError::Input(e.to_string()))?;
                (Some(start), end)
            }
        };

        let confirmed = Confirm::new(&format!(
            "Export from {} to {} (inclusive)?",
            dates
                .0
                .map(|d| d.to_string())
                .unwrap_or_else(|| "the beginning".into()),
            dates.1
        ))
        .with_default(true)
        .prompt()
        .map_err(|e| DomainError::Input(e.to_string()))?;

        Ok(confirmed.then_some(dates))
    }

    /// Run one job on its own task, rendering progress while it works.
    async fn run_job(&self, group: GroupTarget, window: DateWindow) -> Result<(), DomainError> {
        let job = ExportJob { group, window };
        let svc = Arc::clone(&self.export);
        let mut handle = tokio::spawn(async move { svc.run(&job).await });

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("Exporting...");

        let mut rx = self.progress_rx.lock().await;
        let joined = loop {
            tokio::select! {
                res = &mut handle => break res,
                Some(status) = rx.recv() => {
                    spinner.println(&status);
                }
            }
        };
        // Surface anything the job sent in its final moments.
        while let Ok(status) = rx.try_recv() {
            spinner.println(&status);
        }
        drop(rx);

        match joined {
            Ok(Ok(stats)) => {
                spinner.finish_with_message(format!(
                    "Done: {} messages in {} flushes ({} restarts)",
                    stats.messages_exported, stats.flushes, stats.restarts
                ));
                Ok(())
            }
            Ok(Err(e)) => {
                spinner.finish_with_message("Export failed");
                Err(e)
            }
            Err(e) => {
                spinner.finish_with_message("Export task died");
                Err(DomainError::Input(format!("job task: {}", e)))
            }
        }
    }
}

#[async_trait]
impl InputPort for PromptInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let groups = self.registry.load_groups().await?;
        if groups.is_empty() {
            return Err(DomainError::Registry(
                "the group registry has no rows; add groups to the registry sheet".into(),
            ));
        }

        loop {
            let names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
            let selected = Select::new("Select group:", names)
                .prompt()
                .map_err(|e| DomainError::Input(e.to_string()))?;
            let group = groups
                .iter()
                .find(|g| g.name == selected)
                .cloned()
                .ok_or_else(|| DomainError::Input(format!("unknown group: {}", selected)))?;

            if let Some((start, end)) = self.pick_dates()? {
                let window = DateWindow::from_dates(start, end, self.offset);
                if let Err(e) = self.run_job(group, window).await {
                    // Terminal job errors are already logged and notified;
                    // keep the prompt loop alive for the next group.
                    eprintln!("{}", e);
                }
            }

            let again = Confirm::new("Export another group?")
                .with_default(false)
                .prompt()
                .map_err(|e| DomainError::Input(e.to_string()))?;
            if !again {
                return Ok(());
            }
        }
    }
}
