//! # Application Configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `STOCKROOM_*` environment variables (a `.env` file is honoured),
//! then command-line flags applied by the binary.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Config file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "stockroom.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::Invalid(format!("unknown log format '{}'", other))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file holding the catalog
    pub data_file: PathBuf,
    /// Label printed after prices
    pub currency: String,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("products.json"),
            currency: "UAH".to_string(),
            log_level: "warn".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Shape of the TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_file: Option<PathBuf>,
    currency: Option<String>,
    log_level: Option<String>,
    log_format: Option<LogFormat>,
}

impl AppConfig {
    /// Load from the config file and the process environment
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load using `env` to look up environment variables.
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load_with(
        config_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match config_path {
            Some(path) => config.merge_file(read_file(path)?),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    config.merge_file(read_file(path)?);
                }
            }
        }

        if let Some(data_file) = env("STOCKROOM_DATA_FILE") {
            config.data_file = PathBuf::from(data_file);
        }
        if let Some(currency) = env("STOCKROOM_CURRENCY") {
            config.currency = currency;
        }
        if let Some(level) = env("STOCKROOM_LOG") {
            config.log_level = level;
        }
        if let Some(format) = env("STOCKROOM_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Builder: override the data file
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Builder: override the currency label
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Parsed default log level
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }

    fn merge_file(&mut self, file: FileConfig) {
        if let Some(data_file) = file.data_file {
            self.data_file = data_file;
        }
        if let Some(currency) = file.currency {
            self.currency = currency;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if let Some(format) = file.log_format {
            self.log_format = format;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_file must not be empty".into()));
        }
        self.level_filter()?;
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("stockroom.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.data_file, PathBuf::from("products.json"));
        assert_eq!(config.currency, "UAH");
        assert_eq!(config.level_filter().unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_file_then_env() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
                data_file = "shop.json"
                currency = "EUR"
                log_format = "json"
            "#,
        );

        let config =
            AppConfig::load_with(Some(&path), env_of(&[("STOCKROOM_CURRENCY", "USD")])).unwrap();

        assert_eq!(config.data_file, PathBuf::from("shop.json"));
        assert_eq!(config.currency, "USD");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_with(Some(&temp.path().join("nope.toml")), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "port = 8080\n");
        let result = AppConfig::load_with(Some(&path), env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_env_values() {
        assert!(matches!(
            AppConfig::load_with(None, env_of(&[("STOCKROOM_LOG", "chatty")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::load_with(None, env_of(&[("STOCKROOM_LOG_FORMAT", "xml")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_builder_overrides() {
        let config = AppConfig::default()
            .with_data_file("/tmp/other.json")
            .with_currency("PLN");
        assert_eq!(config.data_file, PathBuf::from("/tmp/other.json"));
        assert_eq!(config.currency, "PLN");
    }
}
