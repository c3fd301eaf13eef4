// File: src/server.rs
// Thin HTTP surface: one route serving the rendered PNG.
use crate::client::{HttpFetcher, calendar, weather};
use crate::config::{Config, load_replacement_rules};
use crate::model::event;
use crate::render::Renderer;
use crate::render::fonts::TextPainter;
use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::Local;
use std::sync::Arc;

/// Long-lived pieces shared across render cycles. Config and replacement
/// rules are reloaded per cycle so edits apply without a restart; fonts are
/// loaded once and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: HttpFetcher,
    pub painter: Arc<dyn TextPainter>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/image", get(get_image))
        .with_state(state)
}

/// GET /image — run one render cycle and return the PNG.
async fn get_image(State(state): State<AppState>) -> Result<Response, AppError> {
    let png = render_cycle(&state).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// One full cycle: snapshot the configuration, fetch calendars and weather
/// concurrently, select the display list, render.
pub async fn render_cycle(state: &AppState) -> Result<Vec<u8>> {
    let config = Config::load()?;
    let rules = load_replacement_rules();
    let sources = config.enabled_calendars();
    let now = Local::now();

    let (occurrences, weather) = tokio::join!(
        calendar::gather_occurrences(&state.fetcher, &sources, &rules, now),
        weather::fetch_weather(&state.fetcher, &config.weather)
    );
    let weather = weather?;

    let events = event::select(occurrences);
    log::debug!("Rendering {} event(s)", events.len());

    Renderer::new(state.painter.as_ref()).render(&events, &weather, now)
}

/// Maps hard cycle failures to a 500. Recovered per-source calendar
/// failures never reach this.
struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("Render cycle failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
