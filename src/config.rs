use anyhow::{ensure, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::publishing::retry::RetryConfig;

const DEFAULT_CONFIG_FILE: &str = "servicedir-publishing.toml";
const ENV_PREFIX: &str = "SERVICEDIR_PUBLISHING";

/// Main configuration structure for the publishing workflow
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PublishingConfig {
    /// Completeness validation settings
    pub validation: ValidationConfig,
    /// Retry behaviour on concurrency conflicts
    pub retry: RetryConfig,
    /// Logging and metrics settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Localized fields must be filled in for at least one of these
    pub required_languages: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_languages: vec!["fi".to_string(), "sv".to_string(), "en".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
    /// Collect transition counters
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
        }
    }
}

impl PublishingConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (servicedir-publishing.toml)
    /// 3. Environment variables (prefixed with SERVICEDIR_PUBLISHING__)
    pub fn load() -> Result<Self> {
        let default_file = Path::new(DEFAULT_CONFIG_FILE);
        Self::load_from(default_file.exists().then_some(default_file))
    }

    /// Same layering as [`load`](Self::load) with an explicit file
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("validation.required_languages")
                .try_parsing(true),
        );

        let config: PublishingConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        ensure!(
            self.retry.max_attempts >= 1,
            "retry.max_attempts must be at least 1"
        );
        ensure!(
            self.validation
                .required_languages
                .iter()
                .all(|lang| !lang.trim().is_empty()),
            "validation.required_languages must not contain blank entries"
        );
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance, set once per process
static CONFIG: std::sync::OnceLock<PublishingConfig> = std::sync::OnceLock::new();

/// Get the global configuration, loading the default layers on first use
pub fn config() -> Result<&'static PublishingConfig> {
    init_config(None)
}

/// Initialize configuration (called at startup)
///
/// `path` replaces the default config file. Once a configuration is set,
/// later calls return it unchanged.
pub fn init_config(path: Option<&Path>) -> Result<&'static PublishingConfig> {
    if let Some(existing) = CONFIG.get() {
        return Ok(existing);
    }

    PublishingConfig::load_env_file()?;
    let loaded = match path {
        Some(path) => PublishingConfig::load_from(Some(path)),
        None => PublishingConfig::load(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    Ok(CONFIG.get_or_init(|| loaded))
}
