use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration and return the parsed API base URL.
///
/// Checks:
/// - `api_base_url` is present and non-blank
/// - it parses as an absolute `http` or `https` URL without query or fragment
/// - `upload_chunk_size` is not 0
pub fn validate_config(config: &Config) -> Result<Url, ConfigError> {
    let raw = config
        .api_base_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingBaseUrl)?;

    let url = Url::parse(raw)
        .map_err(|e| ConfigError::ValidationError(format!("api_base_url '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "api_base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::ValidationError(
            "api_base_url cannot carry a query string or fragment".to_string(),
        ));
    }

    if config.upload_chunk_size == 0 {
        return Err(ConfigError::ValidationError(
            "upload_chunk_size cannot be 0".to_string(),
        ));
    }

    Ok(url)
}
