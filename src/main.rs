use anyhow::Context;

use jurnald::api::{self, AppState};
use jurnald::config::Config;
use jurnald::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jurnald=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let conn = db::open_db(&config.db_path)
        .with_context(|| format!("open store at {}", config.db_path.display()))?;
    let state = AppState::new(conn);

    // Load-on-start: surfaces a broken settings slot before traffic does.
    let settings = state.settings.load()?;
    tracing::info!(
        categories = settings.journal_categories.len(),
        theme = ?settings.theme,
        "settings loaded"
    );

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    tracing::info!(addr = %config.addr, db = %config.db_path.display(), "jurnald listening");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
