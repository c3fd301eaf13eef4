use anyhow::{Context, Result};
use inkdesk::client::HttpFetcher;
use inkdesk::config::Config;
use inkdesk::render::fonts::{FontBook, TextPainter};
use inkdesk::server::{AppState, router};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = Config::load()?;

    let painter: Arc<dyn TextPainter> = Arc::new(
        FontBook::load(&config.font_dir)
            .with_context(|| format!("Loading fonts from '{}'", config.font_dir.display()))?,
    );
    let fetcher = HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;

    let state = AppState { fetcher, painter };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    log::info!("inkdesk listening on http://{}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
