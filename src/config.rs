use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::auth::ApprovalConfig;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_DIR: &str = "config";
const ENV_PREFIX: &str = "WAREHOUSE";

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_approval_limits"))]
pub struct AppConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Value-gated approval limits
    #[serde(default)]
    pub approval: ApprovalConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn validate_approval_limits(config: &AppConfig) -> Result<(), ValidationError> {
    if config.approval.level1_limit > config.approval.level2_limit {
        return Err(ValidationError::new("level1_limit_exceeds_level2_limit"));
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            approval: ApprovalConfig::default(),
        }
    }
}

/// Initializes tracing using the provided log level as the default filter.
/// `RUST_LOG` takes precedence when set.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let default_directive = format!("warehouse_workflow={}", level);
    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();
}

impl AppConfig {
    /// Loads configuration from `config/default` (optional) with
    /// `WAREHOUSE__`-prefixed environment overrides, then validates it.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;
        Ok(app_config)
    }
}
