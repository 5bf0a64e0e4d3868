use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the matching service (e.g. "https://topomatch.example.org").
    /// Required; there is no default.
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Overall per-request timeout. Unset means uploads may take as long as they need.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Timeout for establishing the TCP/TLS connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Size of the chunks an upload body is split into; one progress event per chunk.
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Config {
    /// Config pointing at `base_url` with every other key at its default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: Some(base_url.into()),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
            upload_chunk_size: default_upload_chunk_size(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_upload_chunk_size() -> usize {
    64 * 1024
}

fn default_user_agent() -> String {
    concat!("topomatch/", env!("CARGO_PKG_VERSION")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
api_base_url = "http://127.0.0.1:8000"
request_timeout_secs = 120
connect_timeout_secs = 3
upload_chunk_size = 4096
user_agent = "topo-test"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api_base_url.as_deref(), Some("http://127.0.0.1:8000"));
        assert_eq!(config.request_timeout_secs, Some(120));
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.upload_chunk_size, 4096);
        assert_eq!(config.user_agent, "topo-test");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str(r#"api_base_url = "http://localhost""#).unwrap();
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.upload_chunk_size, 65536);
        assert!(config.user_agent.starts_with("topomatch/"));
    }

    #[test]
    fn test_missing_base_url_deserializes_as_none() {
        let config: Config = toml::from_str("connect_timeout_secs = 5").unwrap();
        assert!(config.api_base_url.is_none());
    }

    #[test]
    fn test_with_base_url() {
        let config = Config::with_base_url("https://topo.example.org");
        assert_eq!(config.api_base_url.as_deref(), Some("https://topo.example.org"));
        assert_eq!(config.upload_chunk_size, 65536);
    }
}
