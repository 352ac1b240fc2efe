//! Configuration management for meetscribe.
//!
//! This module handles loading application configuration from a TOML file in
//! the user's config directory, and resolving the API credential from that
//! file or the environment.

pub mod file;

pub use file::{get_config_path, ScribeConfig, API_KEY_ENV};
