//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Legacy environment variable holding the Fal credential
pub const FAL_KEY_VAR: &str = "FAL_KEY";
/// Legacy environment variable holding the record store endpoint
pub const STORE_URL_VAR: &str = "PUBLIC_SUPABASE_URL";
/// Legacy environment variable holding the record store service key
pub const STORE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Image provider (Fal) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Credential sent as `Authorization: Key ...`; requests fail while unset
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default = "default_provider_model")]
    pub model: String,
    #[serde(default = "default_provider_timeout")]
    pub timeout_ms: u64,
}

fn default_provider_base_url() -> String {
    "https://fal.run".to_string()
}

fn default_provider_model() -> String {
    "fal-ai/aura-flow".to_string()
}

fn default_provider_timeout() -> u64 {
    120_000
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
            model: default_provider_model(),
            timeout_ms: default_provider_timeout(),
        }
    }
}

/// Which record store implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgREST / Supabase REST interface
    Rest,
    /// Process-local, non-durable store
    Memory,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub service_key: Option<String>,
    #[serde(default = "default_store_table")]
    pub table: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_ms: u64,
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Rest
}

fn default_store_table() -> String {
    "generated_images".to_string()
}

fn default_store_timeout() -> u64 {
    30_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            url: None,
            service_key: None,
            table: default_store_table(),
            timeout_ms: default_store_timeout(),
        }
    }
}

/// Inbound rate limiting for the generation endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_rpm")]
    pub requests_per_minute: u32,
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_rpm() -> u32 {
    10
}

fn default_burst() -> u32 {
    5
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_minute: default_rpm(),
            burst_size: default_burst(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Read a legacy variable, treating an empty value as unset
fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_str().ok_or_else(|| {
            AppError::Internal("Configuration path is not valid UTF-8".to_string())
        })?;

        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("store.backend", "rest")?
            .set_default("rate_limit.enabled", false)?
            .add_source(File::with_name(path).required(false))
            // Override with environment variables (e.g. T2I__SERVER__PORT)
            .add_source(
                Environment::with_prefix("T2I")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("provider.api_key", non_empty_env(FAL_KEY_VAR))?
            .set_override_option("store.url", non_empty_env(STORE_URL_VAR))?
            .set_override_option("store.service_key", non_empty_env(STORE_KEY_VAR))?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    ///
    /// Missing credentials are not rejected here; they surface
    /// as request-time failures.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }

        if self.provider.model.trim().is_empty() {
            return Err(invalid("Provider model cannot be empty"));
        }

        if self.store.table.trim().is_empty() {
            return Err(invalid("Store table cannot be empty"));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(invalid(&format!(
                "Invalid log format '{}'. Must be 'json' or 'pretty'",
                self.logging.format
            )));
        }

        if self.rate_limit.enabled
            && (self.rate_limit.requests_per_minute == 0 || self.rate_limit.burst_size == 0)
        {
            return Err(invalid(
                "Rate limit requests_per_minute and burst_size must be positive",
            ));
        }

        Ok(())
    }

    /// Names of the store connection parameters that are not set.
    ///
    /// Always empty for the in-memory backend.
    pub fn missing_store_parameters(&self) -> Vec<&'static str> {
        if self.store.backend == StoreBackend::Memory {
            return Vec::new();
        }

        let mut missing = Vec::new();
        if is_blank(&self.store.url) {
            missing.push("store.url");
        }
        if is_blank(&self.store.service_key) {
            missing.push("store.service_key");
        }
        missing
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

fn invalid(message: &str) -> AppError {
    AppError::Settings(config::ConfigError::Message(message.to_string()))
}
