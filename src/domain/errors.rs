//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Chat or sender could not be resolved, or access is denied
    /// (e.g. admin rights required). Fatal for the job, never retried.
    #[error("Resolution failed: {0}")]
    Resolution(String),

    /// Telegram gateway error other than resolution or flood-wait.
    #[error("Telegram gateway error: {0}")]
    Gateway(String),

    /// Destination spreadsheet/worksheet could not be located or created.
    #[error("Sink provisioning failed: {0}")]
    Provision(String),

    /// Row append into the sink failed.
    #[error("Sink error: {0}")]
    Sink(String),

    /// Group registry could not be loaded or parsed.
    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Input error: {0}")]
    Input(String),

    /// FloodWait signal: the platform asks us to pause for `seconds`.
    /// Not a failure for control flow: recovered by a local retry
    /// (sender resolution) or a full job restart.
    #[error("FloodWait: retry after {seconds} seconds")]
    FloodWait { seconds: u64 },
}
