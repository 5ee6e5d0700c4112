use crate::store::disk::CACHE_FILE_NAME;
use anyhow::{Context, Result, bail};
use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_EXCHANGERATE_URL: &str = "https://v6.exchangerate-api.com";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ExchangeRateApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXCHANGERATE_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub exchangerate: ExchangeRateApiConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_hours: default_max_age_hours(),
            path: None,
        }
    }
}

impl CacheConfig {
    /// Freshness window for cached rates; rejects negative or out-of-range hours.
    pub fn max_age(&self) -> Result<Duration> {
        if self.max_age_hours < 0 {
            bail!("cache.max_age_hours must not be negative, got {}", self.max_age_hours);
        }
        match Duration::try_hours(self.max_age_hours) {
            Some(max_age) => Ok(max_age),
            None => bail!("cache.max_age_hours is out of range: {}", self.max_age_hours),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_true")]
    pub demo_fallback: bool,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            providers: ProvidersConfig::default(),
            cache: CacheConfig::default(),
            demo_fallback: true,
            data_path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_currency() -> String {
    "RUB".to_string()
}

fn default_max_age_hours() -> i64 {
    crate::core::currency::DEFAULT_MAX_AGE_HOURS
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = project_dirs()?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(self.default_data_path()?.join(CACHE_FILE_NAME)),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.base_currency = config.base_currency.trim().to_uppercase();
        config
            .cache
            .max_age()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "xconv", "xconv").context("Could not determine project directories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: "usd"
providers:
  exchangerate:
    base_url: "http://example.com/rates"
    api_key: "secret"
cache:
  enabled: false
  max_age_hours: 6
  path: "/tmp/rates.json"
demo_fallback: false
data_path: "/tmp/xconv"
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml_str.as_bytes()).unwrap();

        let config = AppConfig::load_from_path(file.path()).expect("Failed to load");
        assert_eq!(config.base_currency, "USD");
        assert_eq!(config.providers.exchangerate.base_url, "http://example.com/rates");
        assert_eq!(config.providers.exchangerate.api_key.as_deref(), Some("secret"));
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.max_age().unwrap(), Duration::hours(6));
        assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/rates.json"));
        assert!(!config.demo_fallback);
        assert_eq!(config.default_data_path().unwrap(), PathBuf::from("/tmp/xconv"));
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.base_currency, "RUB");
        assert_eq!(config.providers.exchangerate.base_url, DEFAULT_EXCHANGERATE_URL);
        assert!(config.providers.exchangerate.api_key.is_none());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_age().unwrap(), Duration::hours(24));
        assert!(config.demo_fallback);

        let partial: AppConfig = serde_yaml::from_str(
            r#"
cache:
  max_age_hours: 1
"#,
        )
        .unwrap();
        assert!(partial.cache.enabled);
        assert_eq!(partial.cache.max_age_hours, 1);
    }

    #[test]
    fn test_out_of_range_max_age_is_error() {
        let config: AppConfig =
            serde_yaml::from_str("cache:\n  max_age_hours: 9223372036854775807\n").unwrap();
        let err = config.cache.max_age().unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let config: AppConfig = serde_yaml::from_str("cache:\n  max_age_hours: -1\n").unwrap();
        assert!(config.cache.max_age().is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"cache:\n  max_age_hours: 9223372036854775807\n").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_cache_path_under_data_path() {
        let config = AppConfig {
            data_path: Some("/var/lib/xconv".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/var/lib/xconv").join(CACHE_FILE_NAME)
        );
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
