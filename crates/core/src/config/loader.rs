use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `TOPOMATCH_API_BASE_URL`.
pub const CONFIG_ENV_PREFIX: &str = "TOPOMATCH_";

/// Load configuration from an optional TOML file with environment variable overrides.
///
/// Passing `Some(path)` for a file that does not exist is an error; `None` reads the
/// environment only.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    let config: Config = figment
        .merge(Env::prefixed(CONFIG_ENV_PREFIX))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
api_base_url = "http://localhost:8000"
upload_chunk_size = 1024
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.upload_chunk_size, 1024);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let result = load_config_from_str(r#"upload_chunk_size = "big""#);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Some(Path::new("/nonexistent/topomatch.toml")));
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
api_base_url = "http://10.0.0.5:8000"
connect_timeout_secs = 2
"#
        )
        .unwrap();

        let config = load_config(Some(temp_file.path())).unwrap();
        assert_eq!(config.connect_timeout_secs, 2);
        assert_eq!(config.upload_chunk_size, 65536);
    }
}
