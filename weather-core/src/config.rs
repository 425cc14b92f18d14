use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    cache::{DEFAULT_CACHE_FILE, DEFAULT_TTL},
    model::Units,
    provider::openweather::DEFAULT_ENDPOINT,
};

/// Environment variable holding the OpenWeather API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Optional settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// units = "imperial"
/// cache_file = "/home/me/.cache/weather.json"
/// ttl_secs = 300
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub units: Option<Units>,
    pub cache_file: Option<PathBuf>,
    pub ttl_secs: Option<u64>,
    /// Override for the provider URL.
    pub endpoint: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub units: Units,
    pub cache_file: PathBuf,
    pub ttl: Duration,
    pub endpoint: String,
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-cache", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Merge with the API key taken from the environment, which wins over the file.
    pub fn resolve(&self, env_api_key: Option<String>) -> Result<Settings> {
        let api_key = env_api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "{API_KEY_ENV} not found.\n\
                     Hint: create a .env file containing {API_KEY_ENV}=your_key_here"
                )
            })?;

        Ok(Settings {
            api_key,
            units: self.units.unwrap_or_default(),
            cache_file: self
                .cache_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)),
            ttl: self.ttl_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TTL),
            endpoint: self.endpoint.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        })
    }
}
