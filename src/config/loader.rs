//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered lowest to
//! highest precedence:
//!
//! 1. Built-in defaults ([`GatewayConfig::default`])
//! 2. `weather-gateway.toml` in the config directory (optional)
//! 3. `weather-gateway.{environment}.toml` (optional)
//! 4. `WEATHER_GATEWAY__SECTION__FIELD` environment variables
//! 5. Conventional deployment variables (`OPENWEATHER_API_KEY`, `DATABASE_URL`,
//!    `REDIS_URL`, `PORT`)

use super::error::{ConfigResult, ConfigurationError};
use super::{redact_url, GatewayConfig};
use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_STEM: &str = "weather-gateway";
const ENV_PREFIX: &str = "WEATHER_GATEWAY";

/// Loaded, validated configuration plus the context it was loaded from
#[derive(Debug)]
pub struct ConfigManager {
    config: GatewayConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let mut config = Self::load_and_merge_config(&config_directory, environment)?;
        config.environment = environment.to_string();
        Self::apply_legacy_overrides(&mut config)?;

        config.validate()?;

        info!(
            environment = %environment,
            port = config.server.port,
            cache_backend = %config.cache.backend,
            redis_url = %config.cache.redis_url.as_deref().map(redact_url).unwrap_or_default(),
            database_url = %config.database.url.as_deref().map(redact_url).unwrap_or_default(),
            api_key_configured = config.upstream.has_api_key(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration (tests and embedding)
    pub fn from_config(config: GatewayConfig) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        let environment = config.environment.clone();
        Ok(Arc::new(ConfigManager {
            config,
            environment,
            config_directory: PathBuf::from("config"),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("WEATHER_GATEWAY_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<GatewayConfig> {
        let base_file = config_directory.join(CONFIG_FILE_STEM);
        let env_file = config_directory.join(format!("{CONFIG_FILE_STEM}.{environment}"));

        let settings = Config::builder()
            .add_source(Config::try_from(&GatewayConfig::default())?)
            .add_source(File::from(base_file).required(false))
            .add_source(File::from(env_file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<GatewayConfig>()?)
    }

    /// Conventional platform variables win over everything else
    fn apply_legacy_overrides(config: &mut GatewayConfig) -> ConfigResult<()> {
        if let Some(key) = non_empty_var("OPENWEATHER_API_KEY") {
            config.upstream.api_key = Some(key);
        }
        if let Some(url) = non_empty_var("DATABASE_URL") {
            config.database.url = Some(url);
        }
        if let Some(url) = non_empty_var("REDIS_URL") {
            config.cache.redis_url = Some(url);
            if config.cache.backend == "memory" {
                config.cache.backend = "redis".to_string();
            }
        }
        if let Some(port) = non_empty_var("PORT") {
            config.server.port = port.parse().map_err(|_| {
                ConfigurationError::invalid_value("PORT", port.clone(), "expected a TCP port number")
            })?;
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
