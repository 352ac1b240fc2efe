//! Effective configuration report.
//!
//! Prints what a transcribe run would use: the config file location, the
//! service endpoint and timeouts, the poll policy, and where the API key comes
//! from. The key itself is never printed.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use crate::config::{get_config_path, ScribeConfig, API_KEY_ENV};
use crate::transcription::PollPolicy;

/// Loads the configuration and prints the settings in effect.
///
/// # Errors
/// - If the config path cannot be determined
/// - If the config file exists but cannot be parsed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    let config = ScribeConfig::load()?;
    let env_key = std::env::var(API_KEY_ENV).ok();

    tracing::debug!("Describing configuration from {}", config_path.display());
    print!("{}", describe_config(&config, &config_path, env_key.as_deref()));
    Ok(())
}

/// Where the credential for the next run comes from.
#[derive(Debug, PartialEq, Eq)]
enum KeySource {
    Environment,
    File,
    Missing,
}

impl KeySource {
    fn resolve(config: &ScribeConfig, env_key: Option<&str>) -> Self {
        if env_key.is_some_and(|k| !k.trim().is_empty()) {
            KeySource::Environment
        } else if !config.service.api_key.trim().is_empty() {
            KeySource::File
        } else {
            KeySource::Missing
        }
    }
}

impl Display for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Environment => write!(f, "set (from {API_KEY_ENV})"),
            KeySource::File => f.write_str("set (from config file)"),
            KeySource::Missing => write!(f, "missing, set [service] api_key or {API_KEY_ENV}"),
        }
    }
}

fn describe_config(config: &ScribeConfig, config_path: &Path, env_key: Option<&str>) -> String {
    let file_state = if config_path.exists() { "" } else { " (not created yet, defaults in use)" };
    let service = &config.service;

    let mut report = format!("Config file:      {}{file_state}\n", config_path.display());
    report.push_str(&format!("API key:          {}\n", KeySource::resolve(config, env_key)));
    report.push_str(&format!("Base URL:         {}\n", service.base_url));
    report.push_str(&format!("Connect timeout:  {}s\n", service.connect_timeout_secs));
    report.push_str(&format!("Request timeout:  {}s\n", service.request_timeout_secs));
    report.push_str(&format!("Upload timeout:   {}s\n", service.upload_timeout_secs));

    match config.poll.to_policy() {
        Ok(policy) => report.push_str(&describe_policy(&policy)),
        Err(e) => report.push_str(&format!("Poll policy:      invalid, {e}\n")),
    }
    report
}

fn describe_policy(policy: &PollPolicy) -> String {
    let mut lines = format!("Poll interval:    {}\n", secs(policy.interval));

    if policy.backoff_factor > 1.0 {
        let cap = policy
            .max_interval
            .map_or_else(|| "no cap".to_string(), |cap| format!("up to {}", secs(cap)));
        lines.push_str(&format!("Poll backoff:     x{} ({cap})\n", policy.backoff_factor));
    }

    if policy.is_unbounded() {
        lines.push_str("Poll limit:       none, waits until the job finishes\n");
    } else {
        let mut limits = Vec::new();
        if let Some(max_attempts) = policy.max_attempts {
            limits.push(format!("{max_attempts} status checks"));
        }
        if let Some(timeout) = policy.timeout {
            limits.push(secs(timeout));
        }
        lines.push_str(&format!("Poll limit:       {}\n", limits.join(" or ")));
    }
    lines
}

fn secs(duration: Duration) -> String {
    format!("{}s", duration.as_secs())
}
