use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CatalogError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "CATALOG_API_URL";
const CONFIG_FILENAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl CatalogConfig {
    /// `config.json` in the platform config directory, if one can be determined.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "catalog").map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
    }

    /// Read a config file. A missing file yields `Ok(None)`; a malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Option<Self>, CatalogError> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents).map_err(|e| {
            CatalogError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(Some(config))
    }

    /// Resolve the effective configuration: `api_url_flag`, then
    /// `CATALOG_API_URL`, then the config file, then defaults.
    pub fn load(api_url_flag: Option<String>) -> Result<Self, CatalogError> {
        let from_file = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => None,
        };

        Ok(from_file
            .unwrap_or_default()
            .with_overrides(std::env::var(API_URL_ENV).ok(), api_url_flag))
    }

    /// Apply the environment value and then the command-line flag on top.
    /// Empty values are ignored.
    pub fn with_overrides(mut self, env_url: Option<String>, flag_url: Option<String>) -> Self {
        for url in [env_url, flag_url].into_iter().flatten() {
            if !url.trim().is_empty() {
                self.api_base_url = url.trim().to_string();
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
