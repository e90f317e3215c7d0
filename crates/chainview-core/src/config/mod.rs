//! Client configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod api;
pub mod logging;
pub mod realtime;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::api::ApiConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::store::StoreConfig;

use crate::error::AppError;

/// Root client configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay) and `CHAINVIEW__*`
/// environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST backend settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Push channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Reconciliation store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with `config/{env}` and environment variables
    /// prefixed with `CHAINVIEW__` (e.g. `CHAINVIEW__API__BASE_URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHAINVIEW")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::configuration("api.base_url must not be empty"));
        }
        if self.realtime.ws_url.trim().is_empty() {
            return Err(AppError::configuration("realtime.ws_url must not be empty"));
        }
        if self.api.page_size == 0 {
            return Err(AppError::configuration("api.page_size must be at least 1"));
        }
        if self.realtime.backoff_base_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.backoff_base_seconds must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime.max_reconnect_attempts, 5);
        assert_eq!(config.realtime.backoff_base_seconds, 2);
        assert_eq!(config.store.recent_limit, 5);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: AppConfig = from_json(
            r#"{ "api": { "base_url": "https://api.example.test/v1" } }"#,
        );
        assert_eq!(config.api.base_url, "https://api.example.test/v1");
        assert_eq!(config.api.page_size, 20);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_empty_urls() {
        let mut config = AppConfig::default();
        config.realtime.ws_url = String::new();
        assert!(config.validate().is_err());
    }

    fn from_json(json: &str) -> AppConfig {
        serde_json::from_str(json).expect("config json")
    }
}
