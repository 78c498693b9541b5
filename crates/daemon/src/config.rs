//! Daemon configuration
//!
//! Layered with the `config` crate, later layers win:
//! 1. built-in defaults
//! 2. optional TOML file (`SOCIALSPARK_CONFIG`, default `~/.socialspark/config.toml`)
//! 3. `SOCIALSPARK_*` environment variables

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use socialspark_api_rpc::server::{DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use socialspark_core::application::constants::{DEFAULT_RETRY_DELAY, DEFAULT_RETRY_MAX_ATTEMPTS};
use socialspark_core::{AppError, Result};
use socialspark_infra_gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use std::time::Duration;

const ENV_PREFIX: &str = "SOCIALSPARK";
const CONFIG_PATH_VAR: &str = "SOCIALSPARK_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "~/.socialspark/config.toml";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Fallback variables for the Gemini key, checked in order
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Which backend classifies mood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodBackend {
    Gemini,
    Heuristic,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub gemini_api_base: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub request_timeout_secs: u64,
    pub retry_max_attempts: u32,
    pub retry_delay_ms: u64,
    pub mood_backend: MoodBackend,
    pub auto_theme: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            rpc_host: DEFAULT_RPC_HOST.to_string(),
            rpc_port: DEFAULT_RPC_PORT,
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry_max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            mood_backend: MoodBackend::Gemini,
            auto_theme: true,
        }
    }
}

impl std::fmt::Debug for DaemonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonConfig")
            .field("rpc_host", &self.rpc_host)
            .field("rpc_port", &self.rpc_port)
            .field("gemini_api_base", &self.gemini_api_base)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry_max_attempts", &self.retry_max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("mood_backend", &self.mood_backend)
            .field("auto_theme", &self.auto_theme)
            .finish()
    }
}

impl DaemonConfig {
    /// Load from the config file and environment
    ///
    /// # Errors
    /// - `AppError::Config` on unreadable sources or invalid values
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = shellexpand::tilde(&path).into_owned();

        Self::from_builder(
            Config::builder()
                .add_source(File::new(&path, FileFormat::Toml).required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to read configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.rpc_host.trim().is_empty() {
            return Err(AppError::Config("rpc_host must not be empty".to_string()));
        }
        if self.gemini_api_base.trim().is_empty() {
            return Err(AppError::Config("gemini_api_base must not be empty".to_string()));
        }
        if self.gemini_model.trim().is_empty() {
            return Err(AppError::Config("gemini_model must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.retry_max_attempts == 0 {
            return Err(AppError::Config(
                "retry_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Gemini key from config, else the first non-empty fallback variable
    ///
    /// # Errors
    /// - `AppError::Config` if no key is found anywhere
    pub fn api_key(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
        self.gemini_api_key
            .clone()
            .into_iter()
            .chain(API_KEY_VARS.iter().filter_map(|name| lookup(name)))
            .find(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "Gemini API key missing: set gemini_api_key, GEMINI_API_KEY or GOOGLE_API_KEY"
                        .to_string(),
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Result<DaemonConfig> {
        DaemonConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("").unwrap();
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert_eq!(config.rpc_port, 9633);
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(config.mood_backend, MoodBackend::Gemini);
        assert!(config.auto_theme);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            rpc_port = 9700
            mood_backend = "heuristic"
            auto_theme = false
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_port, 9700);
        assert_eq!(config.mood_backend, MoodBackend::Heuristic);
        assert!(!config.auto_theme);
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            from_toml("retry_max_attempts = 0"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            from_toml("mood_backend = \"oracle\""),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            from_toml("request_timeout_secs = 0"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_api_key_fallback_order() {
        let config = DaemonConfig::default();
        let env = |name: &str| match name {
            "GEMINI_API_KEY" => Some(String::new()),
            "GOOGLE_API_KEY" => Some("google-key".to_string()),
            _ => None,
        };
        assert_eq!(config.api_key(env).unwrap(), "google-key");

        let configured = DaemonConfig {
            gemini_api_key: Some("file-key".to_string()),
            ..DaemonConfig::default()
        };
        assert_eq!(configured.api_key(env).unwrap(), "file-key");

        assert!(config.api_key(|_| None).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = DaemonConfig {
            gemini_api_key: Some("secret".to_string()),
            ..DaemonConfig::default()
        };
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
