//! Configuration file management for meetscribe.
//!
//! This module handles loading application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::transcription::{
    Credential, PollPolicy, TranscriptionConfig, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_UPLOAD_TIMEOUT,
};

/// Largest accepted `poll.backoff_factor`.
pub const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// Environment variable that overrides `service.api_key`.
pub const API_KEY_ENV: &str = "ASSEMBLYAI_API_KEY";

/// Transcription service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// AssemblyAI API key. Empty means "not configured".
    #[serde(default)]
    pub api_key: String,
    /// API root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Overall timeout for a submit or status request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Overall timeout for uploading the audio file, in seconds
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,
    /// Connection establishment timeout, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_upload_timeout_secs() -> u64 {
    DEFAULT_UPLOAD_TIMEOUT.as_secs()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Job polling settings. Leaving both bounds unset polls until the job finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between two status checks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Give up after this many status checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Give up after this many seconds of polling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Interval multiplier after each check (1.0 = fixed interval)
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Upper bound for the grown interval, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_interval_secs: Option<u64>,
}

fn default_interval_secs() -> u64 {
    5
}

fn default_backoff_factor() -> f64 {
    1.0
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            max_attempts: None,
            timeout_secs: None,
            backoff_factor: default_backoff_factor(),
            max_interval_secs: None,
        }
    }
}

impl PollConfig {
    /// Validates the settings and turns them into a [`PollPolicy`].
    pub fn to_policy(&self) -> anyhow::Result<PollPolicy> {
        if self.interval_secs == 0 {
            return Err(anyhow!("poll.interval_secs must be at least 1"));
        }
        if self.max_attempts == Some(0) {
            return Err(anyhow!("poll.max_attempts must be at least 1"));
        }
        if !(1.0..=MAX_BACKOFF_FACTOR).contains(&self.backoff_factor) {
            return Err(anyhow!(
                "poll.backoff_factor must be between 1.0 and {MAX_BACKOFF_FACTOR}, got {}",
                self.backoff_factor
            ));
        }
        if let Some(max_interval_secs) = self.max_interval_secs {
            if max_interval_secs < self.interval_secs {
                return Err(anyhow!(
                    "poll.max_interval_secs ({max_interval_secs}) must not be below poll.interval_secs ({})",
                    self.interval_secs
                ));
            }
        }

        let mut policy = PollPolicy::unbounded(Duration::from_secs(self.interval_secs)).with_backoff(
            self.backoff_factor,
            self.max_interval_secs.map(Duration::from_secs),
        );
        if let Some(max_attempts) = self.max_attempts {
            policy = policy.with_max_attempts(max_attempts);
        }
        if let Some(timeout_secs) = self.timeout_secs {
            policy = policy.with_timeout(Duration::from_secs(timeout_secs));
        }
        Ok(policy)
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScribeConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

impl ScribeConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_toml_str(&config_content)
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: ScribeConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Resolves the credential, preferring a non-empty `env_key`.
    pub fn credential(&self, env_key: Option<String>) -> anyhow::Result<Credential> {
        let key = env_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| self.service.api_key.trim().to_string());

        if key.is_empty() {
            let path = get_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "~/.config/meetscribe/meetscribe.toml".to_string());
            return Err(anyhow!(
                "No AssemblyAI API key configured. Set api_key under [service] in {path} or export {API_KEY_ENV}"
            ));
        }

        Ok(Credential::new(key))
    }

    /// Builds the transcription client configuration.
    pub fn transcription_config(&self, env_key: Option<String>) -> anyhow::Result<TranscriptionConfig> {
        let credential = self.credential(env_key)?;
        let poll = self.poll.to_policy()?;

        let mut config = TranscriptionConfig::new(credential)
            .with_base_url(self.service.base_url.clone())
            .with_poll_policy(poll);
        config.request_timeout = Duration::from_secs(self.service.request_timeout_secs);
        config.upload_timeout = Duration::from_secs(self.service.upload_timeout_secs);
        config.connect_timeout = Duration::from_secs(self.service.connect_timeout_secs);
        Ok(config)
    }
}

/// Retrieves the path to the config file, creating its directory.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("meetscribe");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("meetscribe.toml"))
}
