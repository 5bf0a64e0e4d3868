mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str, CONFIG_ENV_PREFIX};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("API base URL is not configured (set TOPOMATCH_API_BASE_URL or api_base_url)")]
    MissingBaseUrl,

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
