//! Application configuration module
//! This module handles loading, overriding and validating the client
//! configuration and mapping it onto [`TranslatorOptions`].

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::http::{BackoffPolicy, RetryConfig};
use crate::translation::{DocumentPolling, Translator, TranslatorOptions};

/// Environment variable overriding `auth_key`
pub const ENV_AUTH_KEY: &str = "DEEPL_AUTH_KEY";

/// Environment variable overriding `server_url`
pub const ENV_SERVER_URL: &str = "DEEPL_SERVER_URL";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// DeepL auth key; keys ending in `:fx` belong to free accounts
    #[serde(default)]
    pub auth_key: String,

    /// Server URL override
    #[serde(default)]
    pub server_url: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Request timeout and retry settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Document polling and download settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Batch fan-out settings
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Request timeout and retry settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HttpConfig {
    /// Timeout of each individual attempt
    #[serde(default = "default_per_attempt_timeout_secs")]
    pub per_attempt_timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout_secs: default_per_attempt_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Document polling and download settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DocumentConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Download retries while the document is not ready
    #[serde(default = "default_download_retries")]
    pub download_retries: u32,

    #[serde(default = "default_download_retry_delay_secs")]
    pub download_retry_delay_secs: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            download_retries: default_download_retries(),
            download_retry_delay_secs: default_download_retry_delay_secs(),
        }
    }
}

/// Batch fan-out settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Max concurrent target translations
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Translate targets concurrently
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            parallel: default_true(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_per_attempt_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_download_retries() -> u32 {
    5
}

fn default_download_retry_delay_secs() -> u64 {
    5
}

fn default_concurrent_requests() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the configuration from a JSON file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults, then apply
    /// environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Override values from `DEEPL_AUTH_KEY` and `DEEPL_SERVER_URL`
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Override values from any variable source
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(auth_key) = lookup(ENV_AUTH_KEY).filter(|v| !v.trim().is_empty()) {
            self.auth_key = auth_key;
        }
        if let Some(server_url) = lookup(ENV_SERVER_URL).filter(|v| !v.trim().is_empty()) {
            self.server_url = Some(server_url);
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.auth_key.trim().is_empty() {
            return Err(anyhow!(
                "An auth key is required, set auth_key in the config file or {}",
                ENV_AUTH_KEY
            ));
        }

        if let Some(server_url) = &self.server_url {
            Url::parse(server_url).with_context(|| format!("Invalid server URL: {}", server_url))?;
        }

        if self.http.per_attempt_timeout_secs == 0 {
            return Err(anyhow!("http.per_attempt_timeout_secs must be greater than 0"));
        }

        if self.batch.concurrent_requests == 0 {
            return Err(anyhow!("batch.concurrent_requests must be greater than 0"));
        }

        Ok(())
    }
}

impl From<&Config> for TranslatorOptions {
    fn from(config: &Config) -> Self {
        Self {
            server_url: config.server_url.clone(),
            headers: Vec::new(),
            retry: RetryConfig {
                per_attempt_timeout: Duration::from_secs(config.http.per_attempt_timeout_secs),
                max_retries: config.http.max_retries,
            },
            backoff: BackoffPolicy::default(),
            document: DocumentPolling {
                poll_interval: Duration::from_secs(config.document.poll_interval_secs),
                download_retries: config.document.download_retries,
                download_retry_delay: Duration::from_secs(config.document.download_retry_delay_secs),
            },
            app_info: None,
        }
    }
}

impl Translator {
    /// Create a translator from a loaded configuration
    pub fn from_config(config: &Config) -> crate::errors::Result<Self> {
        Translator::new(&config.auth_key, TranslatorOptions::from(config))
    }
}
