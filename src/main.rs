//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; the export pipeline lives in the use cases.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tg_sheets::adapters::sheets::{SheetRegistry, SheetsApiSink};
use tg_sheets::adapters::telegram::{GrammersChatGateway, auth, session};
use tg_sheets::adapters::ui::progress::ChannelProgress;
use tg_sheets::adapters::ui::prompt::PromptInputPort;
use tg_sheets::ports::{ChatGateway, InputPort, RegistryPort, SheetSink};
use tg_sheets::shared::config::AppConfig;
use tg_sheets::usecases::{ExportService, SinkProvisioner};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    tg_sheets::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();
    let api_hash = cfg
        .api_hash
        .clone()
        .or_else(|| std::env::var("TG_SHEETS_API_HASH").ok())
        .unwrap_or_default();
    if api_hash.is_empty() {
        anyhow::bail!("Set TG_SHEETS_API_HASH (env or .env). Get from https://my.telegram.org");
    }
    let google_token = cfg
        .google_token()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("Set TG_SHEETS_GOOGLE_TOKEN (OAuth bearer token for Sheets/Drive)")
        })?;
    let registry_url = cfg.registry_url().filter(|u| !u.is_empty()).ok_or_else(|| {
        anyhow::anyhow!("Set TG_SHEETS_REGISTRY_URL (spreadsheet holding the group table)")
    })?;

    let session_path = cfg
        .session_path
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./session.db"));

    // --- Telegram client (one session; auth flow and gateway share it) ---
    let tg_client = create_telegram_client(&cfg, &session_path).await?;
    auth::ensure_authenticated(&tg_client, &api_hash)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let tg: Arc<dyn ChatGateway> = Arc::new(GrammersChatGateway::new(tg_client));

    // --- Google Sheets: sink and registry share one HTTP client ---
    let http = reqwest::Client::new();
    let sink: Arc<dyn SheetSink> = Arc::new(SheetsApiSink::new(http.clone(), google_token.clone()));
    let registry: Arc<dyn RegistryPort> =
        Arc::new(SheetRegistry::new(http, google_token, registry_url));

    let offset = cfg.timezone_offset();
    info!(
        offset_secs = offset.local_minus_utc(),
        "timestamps and date windows use this fixed offset"
    );
    if cfg.share_anyone_or_default() {
        info!("newly created spreadsheets will be shared: anyone with the link can write");
    }

    // --- Services; progress flows over a one-way channel to the prompt loop ---
    let (progress, progress_rx) = ChannelProgress::new();
    let provisioner = SinkProvisioner::new(Arc::clone(&sink), cfg.share_anyone_or_default());
    let export = Arc::new(ExportService::new(
        Arc::clone(&tg),
        Arc::clone(&sink),
        provisioner,
        Arc::new(progress),
    ));

    let input: Arc<dyn InputPort> = Arc::new(PromptInputPort::new(
        registry,
        export,
        progress_rx,
        offset,
    ));

    input.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

/// Create grammers Client with persistent session storage.
/// Loads an existing session from `session_path` if present; otherwise a new
/// session is created and saved after login. Requires TG_SHEETS_API_ID (and
/// TG_SHEETS_API_HASH for login).
async fn create_telegram_client(
    cfg: &AppConfig,
    session_path: &std::path::Path,
) -> anyhow::Result<grammers_client::Client> {
    let api_id = cfg
        .api_id
        .or_else(|| {
            std::env::var("TG_SHEETS_API_ID")
                .ok()
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(0);

    if api_id == 0 {
        anyhow::bail!(
            "Set TG_SHEETS_API_ID (and TG_SHEETS_API_HASH) in .env. Get from https://my.telegram.org"
        );
    }

    let session = session::open_file_session(session_path).await?;
    let session = Arc::new(session);
    let pool = grammers_client::SenderPool::new(session, api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    let client = grammers_client::Client::new(handle);

    Ok(client)
}
