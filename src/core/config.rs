//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Configuration for the translation service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Total submission attempts per request, first call included
    pub request_attempts: u32,
    /// Fetch cycles a premium lookup may run before giving up
    pub premium_max_cycles: u32,
    /// Base delay between attempts, doubled after each failure; 0 disables backoff
    pub retry_delay_ms: u64,
    /// Remote API endpoint; the local simulated API is used when unset
    pub api_endpoint: Option<String>,
    /// HTTP timeout for the remote API
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_attempts: 3,
            premium_max_cycles: 5,
            retry_delay_ms: 100,
            api_endpoint: None,
            timeout_ms: 30000,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let request_attempts = match std::env::var("REQUEST_ATTEMPTS") {
            Ok(v) => v.parse::<u32>()?,
            Err(_) => defaults.request_attempts,
        };

        let premium_max_cycles = match std::env::var("PREMIUM_MAX_CYCLES") {
            Ok(v) => v.parse::<u32>()?,
            Err(_) => defaults.premium_max_cycles,
        };

        let retry_delay_ms = match std::env::var("RETRY_DELAY_MS") {
            Ok(v) => v.parse::<u64>()?,
            Err(_) => defaults.retry_delay_ms,
        };

        let timeout_ms = match std::env::var("REQUEST_TIMEOUT_MS") {
            Ok(v) => v.parse::<u64>()?,
            Err(_) => defaults.timeout_ms,
        };

        let api_endpoint = std::env::var("API_ENDPOINT").ok().filter(|s| !s.is_empty());

        Ok(Self {
            request_attempts,
            premium_max_cycles,
            retry_delay_ms,
            api_endpoint,
            timeout_ms,
        })
    }

    /// Load layered configuration.
    ///
    /// Plain environment variables over defaults (see [`Self::from_env`]), then
    /// an optional `translator.{toml,json,yaml}` file in the working directory,
    /// then `TRANSLATOR_*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("translator"))
    }

    /// Layered load with the settings file looked up at `file_stem`
    /// (`<file_stem>.toml`, `.json` or `.yaml`; may be absent)
    pub fn load_from(file_stem: &Path) -> anyhow::Result<Self> {
        let base = Self::from_env()?;

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&base)?)
            .add_source(config::File::with_name(&file_stem.to_string_lossy()).required(false))
            .add_source(config::Environment::with_prefix("TRANSLATOR").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Loaded config: {} request attempts, {} premium cycles",
            config.request_attempts, config.premium_max_cycles
        );

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_attempts == 0 {
            return Err(anyhow::anyhow!("request_attempts must be greater than 0"));
        }

        if self.premium_max_cycles == 0 {
            return Err(anyhow::anyhow!("premium_max_cycles must be greater than 0"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if let Some(endpoint) = &self.api_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!("api_endpoint must be an http(s) URL"));
            }
        }

        if self.request_attempts > 3 {
            warn!(
                "request_attempts is {}; the translators do not like more than 3 calls",
                self.request_attempts
            );
        }

        Ok(())
    }

    /// Backoff before the given retry (1-based); zero for the first call
    pub fn retry_delay(&self, retry: u32) -> std::time::Duration {
        if retry == 0 || self.retry_delay_ms == 0 {
            return std::time::Duration::ZERO;
        }
        let factor = 2_u64.saturating_pow(retry - 1);
        std::time::Duration::from_millis(self.retry_delay_ms.saturating_mul(factor))
    }

    /// Configuration without any backoff, for tests and local runs
    pub fn immediate() -> Self {
        Self {
            retry_delay_ms: 0,
            ..Default::default()
        }
    }
}
