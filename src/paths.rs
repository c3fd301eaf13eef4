// File: src/paths.rs
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "inkdesk", "inkdesk")
    }

    /// Helper to ensure a directory exists before returning it.
    fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
        if !path.exists() {
            fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(path)
    }

    /// Config directory, overridable with INKDESK_CONFIG_DIR (used by tests).
    pub fn get_config_dir() -> Result<PathBuf> {
        if let Ok(test_dir) = env::var("INKDESK_CONFIG_DIR") {
            return Ok(PathBuf::from(test_dir));
        }
        let proj = Self::get_proj_dirs()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::ensure_exists(proj.config_dir().to_path_buf())
    }

    pub fn get_config_file_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_replacements_file_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("replacements.json"))
    }
}
