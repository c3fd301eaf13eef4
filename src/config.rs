// File: ./src/config.rs
// Handles configuration loading and defaults.
use crate::paths::AppPaths;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

fn default_listen_addr() -> String {
    "0.0.0.0:5229".to_string()
}

fn default_weather_api_url() -> String {
    "https://api.weather.gov".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_font_dir() -> PathBuf {
    PathBuf::from("fonts")
}

/// A single subscribed calendar feed.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct CalendarSource {
    pub name: String,
    pub url: String,
    /// Shifts "today" by N days when resolving this calendar's events only.
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One ordered find/replace entry applied to event titles.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ReplacementRule {
    pub name: String,
    pub find: String,
    pub replace: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct WeatherConfig {
    pub station_id: String,
    #[serde(default = "default_weather_api_url")]
    pub api_url: String,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    #[serde(default)]
    pub calendars: Vec<CalendarSource>,
    pub weather: WeatherConfig,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Config {
    /// Load the configuration from disk.
    /// A missing config file is a hard error: without a calendar list there
    /// is nothing meaningful to render.
    pub fn load() -> Result<Self> {
        let path = AppPaths::get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        // Read the file with contextualized error (covers permission/IO issues).
        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        // Parse TOML with contextualized error (covers syntax issues).
        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Only the sources the pipeline should see. Disabled entries are
    /// filtered here so they never reach the resolver.
    pub fn enabled_calendars(&self) -> Vec<CalendarSource> {
        self.calendars.iter().filter(|c| c.enabled).cloned().collect()
    }
}

/// Load replacement rules from `replacements.json` next to the config file.
/// A missing file yields an empty rule set rather than an error; disabled
/// rules are filtered here so callers only ever see active ones.
pub fn load_replacement_rules() -> Vec<ReplacementRule> {
    let Ok(path) = AppPaths::get_replacements_file_path() else {
        return Vec::new();
    };
    let Ok(json) = fs::read_to_string(&path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<ReplacementRule>>(&json) {
        Ok(rules) => rules.into_iter().filter(|r| r.enabled).collect(),
        Err(e) => {
            log::warn!("Ignoring malformed '{}': {}", path.display(), e);
            Vec::new()
        }
    }
}
