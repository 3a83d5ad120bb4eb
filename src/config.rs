//! Run configuration.
//!
//! Optional settings live in `~/.pd-hygiene/config.json`; `PD_API_URL` and
//! `PD_PAGE_LIMIT` override them. The API key only ever comes from
//! `PD_API_KEY`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HygieneError;
use crate::pagerduty::{DEFAULT_API_URL, MAX_PAGE_LIMIT};

pub const API_KEY_VAR: &str = "PD_API_KEY";
pub const API_URL_VAR: &str = "PD_API_URL";
pub const PAGE_LIMIT_VAR: &str = "PD_PAGE_LIMIT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HygieneConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
    /// Time zone filter sent with the schedule listing.
    #[serde(default = "default_schedule_time_zone")]
    pub schedule_time_zone: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_limit() -> usize {
    MAX_PAGE_LIMIT
}

fn default_schedule_time_zone() -> String {
    "UTC".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HygieneConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_limit: default_page_limit(),
            schedule_time_zone: default_schedule_time_zone(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HygieneConfig {
    /// Apply environment overrides from `lookup` and clamp the page size.
    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, HygieneError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(PAGE_LIMIT_VAR) {
            self.page_limit = raw.trim().parse().map_err(|_| {
                HygieneError::Config(format!("{} must be a number, got '{}'", PAGE_LIMIT_VAR, raw))
            })?;
        }
        self.page_limit = self.page_limit.clamp(1, MAX_PAGE_LIMIT);
        Ok(self)
    }
}

/// Location of the optional config file.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pd-hygiene").join("config.json"))
}

/// Load the config file (if any) and apply process environment overrides.
pub fn load_config() -> Result<HygieneConfig, HygieneError> {
    let file = match config_path() {
        Some(path) => load_config_file(&path)?,
        None => HygieneConfig::default(),
    };
    file.with_overrides(|k| std::env::var(k).ok())
}

/// Read `path` as a config file. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> Result<HygieneConfig, HygieneError> {
    if !path.exists() {
        return Ok(HygieneConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| HygieneError::ConfigFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| HygieneError::ConfigFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read the API key via `lookup`. Blank values count as missing.
pub fn api_key_from<F>(lookup: F) -> Result<String, HygieneError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_KEY_VAR)
        .filter(|k| !k.trim().is_empty())
        .ok_or(HygieneError::MissingCredential(API_KEY_VAR))
}

pub fn api_key() -> Result<String, HygieneError> {
    api_key_from(|k| std::env::var(k).ok())
}
