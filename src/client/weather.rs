// File: src/client/weather.rs
use crate::client::HttpFetcher;
use crate::config::WeatherConfig;
use anyhow::{Context, Result};
use serde::Deserialize;

/// The two lines the date panel displays: temperature and condition text.
pub type WeatherSummary = (String, String);

#[derive(Deserialize)]
struct Observation {
    properties: ObservationProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationProperties {
    text_description: String,
    temperature: Measurement,
}

#[derive(Deserialize)]
struct Measurement {
    value: Option<f64>,
}

/// Fetch the latest observation for the configured station.
///
/// Unlike calendar sources, a failure here fails the whole render cycle:
/// the layout always reserves the weather panel, and serving a stale or
/// blank panel was judged worse than an explicit error the poller retries.
pub async fn fetch_weather(fetcher: &HttpFetcher, config: &WeatherConfig) -> Result<WeatherSummary> {
    let url = format!(
        "{}/stations/{}/observations/latest",
        config.api_url.trim_end_matches('/'),
        config.station_id
    );

    let body = fetcher.fetch_text(&url).await?;
    let observation: Observation =
        serde_json::from_str(&body).context("Failed to parse weather data")?;

    let celsius = observation.properties.temperature.value.unwrap_or_default();
    let fahrenheit = (celsius * 9.0 / 5.0 + 32.0).round();

    Ok((
        format!("{}°F", fahrenheit),
        observation.properties.text_description,
    ))
}
