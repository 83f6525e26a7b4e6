//! Configuration file management for SimScore
//!
//! Values are read from ~/.simscore/config.toml and can be overridden by
//! environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env::{analytics as env_analytics, apis as env_apis, llm as env_llm};
use crate::error::SimScoreError;

pub const DEFAULT_PEER_WINDOW_DAYS: u32 = 90;
pub const DEFAULT_MIN_COHORT_SIZE: usize = 5;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 15 * 60;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub analytics: AnalyticsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ApiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_ai_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LlmSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AnalyticsSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_window_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_cohort_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
}

/// Resolved analytics settings used by `AnalyticsService`
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    pub peer_window_days: u32,
    pub min_cohort_size: usize,
    pub cache_ttl: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            peer_window_days: DEFAULT_PEER_WINDOW_DAYS,
            min_cohort_size: DEFAULT_MIN_COHORT_SIZE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        }
    }
}

const KNOWN_KEYS: &[&str] = &[
    "google-ai-api-key",
    "llm-model",
    "llm-timeout-secs",
    "peer-window-days",
    "min-cohort-size",
    "cache-ttl-secs",
];

impl Config {
    /// Get the config file path (~/.simscore/config.toml)
    pub fn get_config_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().context("Could not find home directory")?;
        Ok(home_dir.join(".simscore").join("config.toml"))
    }

    /// Load configuration from the default location.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        // The file may hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(config_path, permissions).with_context(|| {
                format!(
                    "Failed to set permissions on config file: {}",
                    config_path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get a config value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match normalize_key(key).as_str() {
            "google-ai-api-key" => self.api.google_ai_api_key.clone(),
            "llm-model" => self.llm.model.clone(),
            "llm-timeout-secs" => self.llm.timeout_secs.map(|v| v.to_string()),
            "peer-window-days" => self.analytics.peer_window_days.map(|v| v.to_string()),
            "min-cohort-size" => self.analytics.min_cohort_size.map(|v| v.to_string()),
            "cache-ttl-secs" => self.analytics.cache_ttl_secs.map(|v| v.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        let key = normalize_key(key);
        match key.as_str() {
            "google-ai-api-key" => self.api.google_ai_api_key = Some(value),
            "llm-model" => self.llm.model = Some(value),
            "llm-timeout-secs" => self.llm.timeout_secs = Some(parse_value(&key, &value)?),
            "peer-window-days" => {
                self.analytics.peer_window_days = Some(parse_value(&key, &value)?)
            }
            "min-cohort-size" => self.analytics.min_cohort_size = Some(parse_value(&key, &value)?),
            "cache-ttl-secs" => self.analytics.cache_ttl_secs = Some(parse_value(&key, &value)?),
            _ => return Err(unknown_key(&key)),
        }
        Ok(())
    }

    /// Unset (remove) a config value by key
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let key = normalize_key(key);
        match key.as_str() {
            "google-ai-api-key" => self.api.google_ai_api_key = None,
            "llm-model" => self.llm.model = None,
            "llm-timeout-secs" => self.llm.timeout_secs = None,
            "peer-window-days" => self.analytics.peer_window_days = None,
            "min-cohort-size" => self.analytics.min_cohort_size = None,
            "cache-ttl-secs" => self.analytics.cache_ttl_secs = None,
            _ => return Err(unknown_key(&key)),
        }
        Ok(())
    }

    /// All set values as key-value pairs, API keys masked
    pub fn list(&self) -> Vec<(String, String)> {
        KNOWN_KEYS
            .iter()
            .filter_map(|key| {
                self.get(key).map(|value| {
                    let shown = if *key == "google-ai-api-key" {
                        mask_api_key(&value)
                    } else {
                        value
                    };
                    (key.to_string(), shown)
                })
            })
            .collect()
    }

    /// Resolve analytics settings: environment > config file > defaults
    pub fn analytics_config(&self) -> AnalyticsConfig {
        let peer_window_days = env_override(env_analytics::PEER_WINDOW_DAYS)
            .or(self.analytics.peer_window_days)
            .unwrap_or(DEFAULT_PEER_WINDOW_DAYS);
        let min_cohort_size = env_override(env_analytics::MIN_COHORT_SIZE)
            .or(self.analytics.min_cohort_size)
            .unwrap_or(DEFAULT_MIN_COHORT_SIZE);
        let cache_ttl_secs = env_override(env_analytics::CACHE_TTL_SECS)
            .or(self.analytics.cache_ttl_secs)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);

        AnalyticsConfig {
            peer_window_days,
            min_cohort_size,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        }
    }

    /// Resolve the LLM model override, if any
    pub fn llm_model(&self) -> Option<String> {
        std::env::var(env_llm::SIMSCORE_LLM_MODEL)
            .ok()
            .or_else(|| self.llm.model.clone())
    }

    pub fn llm_timeout_secs(&self) -> u64 {
        env_override(env_llm::SIMSCORE_LLM_TIMEOUT)
            .or(self.llm.timeout_secs)
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS)
    }
}

/// Get the Google AI API key: environment variable first, then config file
pub fn get_google_ai_api_key() -> Result<Option<String>> {
    if let Ok(key) = std::env::var(env_apis::GOOGLE_AI_API_KEY) {
        if !key.trim().is_empty() {
            return Ok(Some(key));
        }
    }

    let config = Config::load()?;
    Ok(config.api.google_ai_api_key)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn unknown_key(key: &str) -> anyhow::Error {
    SimScoreError::invalid_config(format!(
        "Unknown config key: {key}. Valid keys: {}",
        KNOWN_KEYS.join(", ")
    ))
    .into()
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        SimScoreError::validation(key.to_string(), format!("invalid value '{value}'")).into()
    })
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Mask API key for display (show first 4 and last 4 characters)
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
