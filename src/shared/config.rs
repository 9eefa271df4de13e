//! Application configuration. API credentials, locators, timezone.

use chrono::FixedOffset;
use serde::Deserialize;

/// Fixed offset (hours east of UTC) used when none is configured. Matches
/// the deployment the tool was built for; override with
/// TG_SHEETS_TIMEZONE_OFFSET_HOURS.
pub const DEFAULT_TIMEZONE_OFFSET_HOURS: i32 = 8;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub session_path: Option<String>,

    /// OAuth bearer token for the Google Sheets/Drive APIs.
    /// Read from TG_SHEETS_GOOGLE_TOKEN.
    #[serde(default)]
    pub google_token: Option<String>,

    /// URL (or bare id) of the registry spreadsheet holding the group table.
    /// Read from TG_SHEETS_REGISTRY_URL.
    #[serde(default)]
    pub registry_url: Option<String>,

    /// Hours east of UTC for date windows and row timestamps.
    /// Read from TG_SHEETS_TIMEZONE_OFFSET_HOURS.
    #[serde(default)]
    pub timezone_offset_hours: Option<i32>,

    /// Apply "anyone with the link can write" to spreadsheets this tool
    /// creates. Off by default. Read from TG_SHEETS_SHARE_ANYONE.
    #[serde(default)]
    pub share_anyone: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TG_SHEETS"));
        if let Ok(path) = std::env::var("TG_SHEETS_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Google API token from config or TG_SHEETS_GOOGLE_TOKEN env.
    pub fn google_token(&self) -> Option<String> {
        self.google_token
            .clone()
            .or_else(|| std::env::var("TG_SHEETS_GOOGLE_TOKEN").ok())
    }

    /// Registry spreadsheet locator from config or TG_SHEETS_REGISTRY_URL env.
    pub fn registry_url(&self) -> Option<String> {
        self.registry_url
            .clone()
            .or_else(|| std::env::var("TG_SHEETS_REGISTRY_URL").ok())
    }

    /// The configured fixed offset. Falls back to the default when unset or
    /// out of range (FixedOffset rejects anything beyond +/-24h).
    pub fn timezone_offset(&self) -> FixedOffset {
        let hours = self
            .timezone_offset_hours
            .unwrap_or(DEFAULT_TIMEZONE_OFFSET_HOURS);
        FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| {
            FixedOffset::east_opt(DEFAULT_TIMEZONE_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset"))
        })
    }

    /// Whether newly created spreadsheets get the permissive sharing policy.
    pub fn share_anyone_or_default(&self) -> bool {
        self.share_anyone.unwrap_or(false)
    }
}
