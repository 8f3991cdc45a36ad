//! Configuration management for the Billy service.
//!
//! Configuration lives at `~/.billy/config.json` and every field can be
//! overridden through the environment.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! ## Service
//! - `BILLY_HOST` → server.host
//! - `BILLY_PORT` → server.port
//!
//! ## Agent tuning
//! - `BILLY_DEFAULT_MODEL` → agent.default_model
//! - `BILLY_MAX_CONVERSATION_LENGTH` → agent.max_conversation_length
//! - `BILLY_MAX_TOKENS` → agent.max_tokens
//!
//! ## Provider credentials (presence drives the fallback chain)
//! - `CLOUDFLARE_ACCOUNT_ID` → providers.cloudflare_account_id
//! - `CLOUDFLARE_API_TOKEN` → providers.cloudflare_api_token
//! - `ANTHROPIC_API_KEY` → providers.anthropic_api_key
//! - `OPENAI_API_KEY` → providers.openai_api_key
//!
//! ## Storage / observability
//! - `BILLY_DB_PATH` → storage.db_path
//! - `BILLY_LOG_LEVEL` → observability.log_level
//! - `BILLY_LOG_FORMAT` → observability.log_format

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".billy"),
        |dirs| dirs.home_dir().join(".billy"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Server bind configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port number. Default: 8787
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

const fn default_port() -> u16 {
    8787
}

/// Agent tuning options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier sent to the primary backend.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum number of messages kept per session history.
    #[serde(default = "default_max_conversation_length")]
    pub max_conversation_length: usize,

    /// Maximum tokens requested from vendor backends.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            max_conversation_length: default_max_conversation_length(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "@cf/meta/llama-3.1-8b-instruct".into()
}

const fn default_max_conversation_length() -> usize {
    20
}

const fn default_max_tokens() -> i64 {
    1024
}

/// Provider credentials.
///
/// A provider participates in the fallback chain only when its credentials
/// are present and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// Cloudflare account id for the Workers AI primary backend.
    #[serde(default)]
    pub cloudflare_account_id: Option<String>,

    /// Cloudflare API token for the Workers AI primary backend.
    #[serde(default)]
    pub cloudflare_api_token: Option<String>,

    /// Anthropic API key (vendor A fallback).
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key (vendor B fallback).
    #[serde(default)]
    pub openai_api_key: Option<String>,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite database path. When absent, `{config_dir}/billy.db` is used.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: "json" or "pretty".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path with environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file(&config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file, falling back to defaults when
    /// the file does not exist.
    pub fn load_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BILLY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("BILLY_PORT") {
            self.server.port = port;
        }

        if let Ok(model) = std::env::var("BILLY_DEFAULT_MODEL") {
            self.agent.default_model = model;
        }
        if let Some(max) = env_parse("BILLY_MAX_CONVERSATION_LENGTH") {
            self.agent.max_conversation_length = max;
        }
        if let Some(max) = env_parse("BILLY_MAX_TOKENS") {
            self.agent.max_tokens = max;
        }

        override_secret(&mut self.providers.cloudflare_account_id, "CLOUDFLARE_ACCOUNT_ID");
        override_secret(&mut self.providers.cloudflare_api_token, "CLOUDFLARE_API_TOKEN");
        override_secret(&mut self.providers.anthropic_api_key, "ANTHROPIC_API_KEY");
        override_secret(&mut self.providers.openai_api_key, "OPENAI_API_KEY");

        if let Ok(path) = std::env::var("BILLY_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(path));
        }
        if let Ok(level) = std::env::var("BILLY_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("BILLY_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// Resolve the SQLite database path.
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| config_dir().join("billy.db"))
    }
}

/// Parse an environment variable, ignoring unset or malformed values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Override an optional secret from the environment; empty values are ignored.
fn override_secret(slot: &mut Option<String>, name: &str) {
    if let Ok(value) = std::env::var(name) {
        if !value.is_empty() {
            *slot = Some(value);
        }
    }
}
