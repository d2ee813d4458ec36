use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::credential::SECRET_FILE;

/// Weather fields requested for every hour.
pub const DEFAULT_ELEMENTS: &[&str] = &[
    "datetime",
    "temp",
    "feelslike",
    "humidity",
    "dew",
    "precip",
    "precipprob",
    "snow",
    "windspeed",
    "winddir",
    "pressure",
    "cloudcover",
    "visibility",
    "conditions",
];

/// Client configuration stored on disk.
///
/// Example TOML (every key is optional):
/// ```toml
/// location = "Berlin,DE"
/// timeout_secs = 10
/// secret_file = "/home/me/.config/forecast/secrets"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Timeline endpoint, without the location segment.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Location segment of the request path.
    #[serde(default = "default_location")]
    pub location: String,

    /// Timeout for the whole HTTP request, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Plaintext file holding the API key.
    #[serde(default = "default_secret_file")]
    pub secret_file: PathBuf,

    #[serde(default = "default_elements")]
    pub elements: Vec<String>,
}

fn default_base_url() -> String {
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline"
        .to_string()
}

fn default_location() -> String {
    "London,UK".to_string()
}

const fn default_timeout() -> u64 {
    30
}

fn default_secret_file() -> PathBuf {
    PathBuf::from(SECRET_FILE)
}

fn default_elements() -> Vec<String> {
    DEFAULT_ELEMENTS.iter().map(|e| (*e).to_string()).collect()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            location: default_location(),
            timeout_secs: default_timeout(),
            secret_file: default_secret_file(),
            elements: default_elements(),
        }
    }
}

impl ForecastConfig {
    /// Load config from the platform config directory, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: ForecastConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Render as TOML, e.g. for `forecast config`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}
