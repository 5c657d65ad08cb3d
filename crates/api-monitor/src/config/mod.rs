//! Configuration for the monitor and its HTTP dispatcher.
//!
//! The matching predicate (`/api/`, `/graphql`) is fixed and deliberately not
//! part of this configuration.

mod pool;

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

pub use pool::ConnectionPoolConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Origin that relative targets are resolved against, e.g.
    /// `https://app.example.com`. Without it, relative targets are logged
    /// unresolved and cannot be sent by the HTTP dispatcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(default)]
    pub connection_pool: ConnectionPoolConfig,
}

impl MonitorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: MonitorConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.origin_url()?;

        if self.connection_pool.connect_timeout_secs == 0 {
            anyhow::bail!("connection_pool.connect_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Parsed origin, if one is configured.
    pub fn origin_url(&self) -> Result<Option<Url>, anyhow::Error> {
        let Some(origin) = self.origin.as_deref() else {
            return Ok(None);
        };

        let url = Url::parse(origin)
            .map_err(|e| anyhow::anyhow!("Invalid origin '{}': {}", origin, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Unsupported origin scheme: '{}'. Currently supported: http, https",
                url.scheme()
            );
        }
        if url.host_str().is_none() {
            anyhow::bail!("Origin '{}' has no host", origin);
        }

        Ok(Some(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.origin_url().unwrap().is_none());
        assert_eq!(config.connection_pool.connect_timeout_secs, 10);
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
origin: "https://app.example.com"
connection_pool:
  max_idle_per_host: 4
"#;
        let config: MonitorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.origin.as_deref(), Some("https://app.example.com"));
        assert_eq!(config.connection_pool.max_idle_per_host, 4);
        assert_eq!(config.connection_pool.idle_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "origin: http://localhost:8080").unwrap();

        let config = MonitorConfig::from_file(file.path()).unwrap();
        let origin = config.origin_url().unwrap().unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_rejects_non_http_origin() {
        let config = MonitorConfig::default().with_origin("ftp://files.example.com");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported origin scheme"));
    }

    #[test]
    fn test_rejects_relative_origin() {
        let config = MonitorConfig::default().with_origin("/just/a/path");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_connect_timeout() {
        let mut config = MonitorConfig::default();
        config.connection_pool.connect_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
