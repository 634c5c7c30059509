//! Layered configuration
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config` / `QUIVER_CONFIG_PATH`, else `quiver.toml` if present
//! 3. Environment variables such as `QUIVER_CACHE__MAX_ENTRIES=500`
//!
//! A `.env` file in the working directory is loaded first.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "QUIVER";
const CONFIG_PATH_VAR: &str = "QUIVER_CONFIG_PATH";
const DEFAULT_FILE: &str = "quiver";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upper bound on cached documents; unbounded when unset
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Deadline applied to every request, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources with no overrides
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    /// Parse a TOML document directly, skipping files and environment
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Config = toml::from_str(source).context("Invalid configuration TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == Some(0) {
            bail!("cache.max_entries must be greater than zero");
        }
        if self.execution.timeout_ms == Some(0) {
            bail!("execution.timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Builder for [`Config`]; explicit values override every other source
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    cache_max_entries: Option<usize>,
    timeout_ms: Option<u64>,
    log_filter: Option<String>,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn cache_max_entries(mut self, max: Option<usize>) -> Self {
        self.cache_max_entries = max;
        self
    }

    pub fn timeout_ms(mut self, timeout: Option<u64>) -> Self {
        self.timeout_ms = timeout;
        self
    }

    pub fn log_filter(mut self, filter: Option<String>) -> Self {
        self.log_filter = filter;
        self
    }

    pub fn build(self) -> Result<Config> {
        dotenvy::dotenv().ok();

        let mut builder = ::config::Config::builder()
            .set_default("logging.filter", LoggingConfig::default().filter)?;

        let path = self
            .config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from));
        builder = match &path {
            Some(path) => builder.add_source(::config::File::from(path.as_path()).required(true)),
            None => builder.add_source(::config::File::with_name(DEFAULT_FILE).required(false)),
        };

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(max) = self.cache_max_entries {
            builder = builder.set_override("cache.max_entries", max as u64)?;
        }
        if let Some(timeout) = self.timeout_ms {
            builder = builder.set_override("execution.timeout_ms", timeout)?;
        }
        if let Some(filter) = self.log_filter {
            builder = builder.set_override("logging.filter", filter)?;
        }

        let config: Config = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .with_context(|| match &path {
                Some(path) => format!("Failed to load configuration from {}", path.display()),
                None => "Failed to load configuration".to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("quiver-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.max_entries, None);
        assert_eq!(config.execution.timeout(), None);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_from_toml_str() {
        let config = Config::from_toml_str(
            r#"
[cache]
max_entries = 128

[execution]
timeout_ms = 2500
"#,
        )
        .expect("valid config");

        assert_eq!(config.cache.max_entries, Some(128));
        assert_eq!(config.execution.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_zero_cache_bound_is_rejected() {
        let err = Config::from_toml_str("[cache]\nmax_entries = 0\n").expect_err("zero is invalid");
        assert!(err.to_string().contains("cache.max_entries"));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(Config::from_toml_str("[cache\nmax_entries = 1").is_err());
    }

    #[test]
    fn test_file_then_overrides() {
        let path = temp_config("[logging]\nfilter = \"debug\"\n\n[cache]\nmax_entries = 10\n");

        let from_file = Config::builder()
            .config_path(Some(path.clone()))
            .build()
            .expect("file config loads");
        assert_eq!(from_file.logging.filter, "debug");
        assert_eq!(from_file.cache.max_entries, Some(10));

        let overridden = Config::builder()
            .config_path(Some(path.clone()))
            .cache_max_entries(Some(3))
            .timeout_ms(Some(50))
            .build()
            .expect("overrides apply");
        assert_eq!(overridden.cache.max_entries, Some(3));
        assert_eq!(overridden.execution.timeout_ms, Some(50));
        assert_eq!(overridden.logging.filter, "debug");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let missing = std::env::temp_dir().join("quiver-does-not-exist.toml");
        let err = Config::builder()
            .config_path(Some(missing))
            .build()
            .expect_err("explicit path must exist");
        assert!(format!("{:#}", err).contains("quiver-does-not-exist.toml"));
    }
}
