//! Configuration management with validation and defaults
//!
//! TOML file, then environment overrides, then validation.

use crate::errors::{ConfigurationError, DeskResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Backend base URL used when running against a local backend
pub const DEVELOPMENT_API_URL: &str = "http://localhost:5000/api/";

/// Backend base URL used in production, relative to `api.origin`
pub const PRODUCTION_API_URL: &str = "/api/";

pub const ENV_API_URL: &str = "CASINO_DESK_API_URL";
pub const ENV_API_ORIGIN: &str = "CASINO_DESK_API_ORIGIN";
pub const ENV_ENVIRONMENT: &str = "CASINO_DESK_ENV";
pub const ENV_TOKEN_PATH: &str = "CASINO_DESK_TOKEN_PATH";
pub const ENV_IMAGE_CONCURRENCY: &str = "CASINO_DESK_IMAGE_CONCURRENCY";

/// Complete back-office client configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub environment: Environment,
    pub api: ApiSettings,
    pub cache: CacheSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

/// Deployment environment, selects the default backend URL
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigurationError::InvalidValue {
                field: "environment".to_string(),
                value: other.to_string(),
                reason: "expected development or production".to_string(),
            }),
        }
    }
}

/// Backend connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Explicit base URL; falls back to the environment default when unset
    pub base_url: Option<String>,
    /// Origin that relative base URLs are resolved against
    pub origin: Option<String>,
    pub timeout_secs: u64,
    /// Where the bearer token is persisted between runs
    pub token_path: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            origin: None,
            timeout_secs: 30,
            token_path: None,
        }
    }
}

/// Query cache settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 512,
            ttl_secs: 60,
        }
    }
}

/// Interactive report export settings
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Inline every referenced image as a data URI
    pub embed_images: bool,
    /// Maximum number of image downloads in flight
    pub image_concurrency: usize,
    pub output_dir: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            embed_images: true,
            image_concurrency: 4,
            output_dir: ".".to_string(),
        }
    }
}

/// Logging settings, `RUST_LOG` wins when set
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "casino_desk=info".to_string(),
        }
    }
}

impl DeskConfig {
    /// Configuration for a backend running on the developer machine
    pub fn development() -> Self {
        Self::default()
    }

    /// Configuration for the deployed back-office
    pub fn production(origin: &str) -> Self {
        Self {
            environment: Environment::Production,
            api: ApiSettings {
                origin: Some(origin.to_string()),
                ..Default::default()
            },
            logging: LoggingSettings {
                filter: "casino_desk=warn".to_string(),
            },
            ..Default::default()
        }
    }

    /// Resolve the backend base URL, always ending with a slash so relative
    /// endpoint paths join beneath it
    pub fn resolved_base_url(&self) -> Result<Url, ConfigurationError> {
        let raw = self.api.base_url.clone().unwrap_or_else(|| match self.environment {
            Environment::Development => DEVELOPMENT_API_URL.to_string(),
            Environment::Production => PRODUCTION_API_URL.to_string(),
        });
        let raw = if raw.ends_with('/') { raw } else { format!("{}/", raw) };

        match Url::parse(&raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let origin = self.api.origin.as_deref().ok_or_else(|| {
                    ConfigurationError::MissingRequired(format!(
                        "api.origin (needed to resolve relative base URL '{}')",
                        raw
                    ))
                })?;
                Url::parse(origin)
                    .and_then(|origin| origin.join(&raw))
                    .map_err(|e| ConfigurationError::InvalidValue {
                        field: "api.origin".to_string(),
                        value: origin.to_string(),
                        reason: e.to_string(),
                    })
            }
            Err(e) => Err(ConfigurationError::InvalidValue {
                field: "api.base_url".to_string(),
                value: raw,
                reason: e.to_string(),
            }),
        }
    }

    /// Location of the persisted bearer token
    pub fn token_path(&self) -> PathBuf {
        if let Some(path) = &self.api.token_path {
            return PathBuf::from(path);
        }
        match env::var_os("HOME") {
            Some(home) => Path::new(&home).join(".casino-desk").join("token"),
            None => PathBuf::from(".casino-desk-token"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> DeskResult<DeskConfig> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup
    pub fn load_with_env<F>(&self, lookup: F) -> DeskResult<DeskConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => DeskConfig::default(),
        };

        apply_env_overrides(&mut config, lookup)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> DeskResult<DeskConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Save configuration to file
    pub fn save(&self, config: &DeskConfig, path: &str) -> DeskResult<()> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigurationError::SaveFailed(format!("Failed to write to {}: {}", path, e)).into())
    }
}

fn apply_env_overrides<F>(config: &mut DeskConfig, lookup: F) -> Result<(), ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(environment) = lookup(ENV_ENVIRONMENT) {
        config.environment = environment.parse()?;
    }
    if let Some(url) = lookup(ENV_API_URL) {
        config.api.base_url = Some(url);
    }
    if let Some(origin) = lookup(ENV_API_ORIGIN) {
        config.api.origin = Some(origin);
    }
    if let Some(path) = lookup(ENV_TOKEN_PATH) {
        config.api.token_path = Some(path);
    }
    if let Some(limit) = lookup(ENV_IMAGE_CONCURRENCY) {
        config.export.image_concurrency = limit.parse().map_err(|_| ConfigurationError::InvalidValue {
            field: ENV_IMAGE_CONCURRENCY.to_string(),
            value: limit.clone(),
            reason: "Invalid number".to_string(),
        })?;
    }

    Ok(())
}

/// Validate configuration for logical consistency
pub fn validate(config: &DeskConfig) -> Result<(), ConfigurationError> {
    config.resolved_base_url()?;

    if config.api.timeout_secs == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "api.timeout_secs".to_string(),
            value: "0".to_string(),
            reason: "Timeout cannot be zero".to_string(),
        });
    }

    if config.cache.capacity == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "cache.capacity".to_string(),
            value: "0".to_string(),
            reason: "Cache capacity cannot be zero".to_string(),
        });
    }

    if config.cache.ttl_secs == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "cache.ttl_secs".to_string(),
            value: "0".to_string(),
            reason: "Cache TTL cannot be zero".to_string(),
        });
    }

    if config.export.image_concurrency == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "export.image_concurrency".to_string(),
            value: "0".to_string(),
            reason: "At least one image download must be allowed".to_string(),
        });
    }

    if config.export.output_dir.is_empty() {
        return Err(ConfigurationError::MissingRequired("export.output_dir".to_string()));
    }

    Ok(())
}

/// Generate a sample configuration file
pub fn generate_sample_config(path: &str) -> DeskResult<()> {
    ConfigLoader::new().save(&DeskConfig::default(), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = DeskConfig::default();
        assert!(validate(&config).is_ok());
        assert_eq!(config.resolved_base_url().unwrap().as_str(), DEVELOPMENT_API_URL);
    }

    #[test]
    fn test_production_resolves_relative_base_url() {
        let config = DeskConfig::production("https://backoffice.example.com");
        assert_eq!(
            config.resolved_base_url().unwrap().as_str(),
            "https://backoffice.example.com/api/"
        );
    }

    #[test]
    fn test_production_without_origin_is_rejected() {
        let mut config = DeskConfig::production("https://backoffice.example.com");
        config.api.origin = None;
        assert!(matches!(
            validate(&config),
            Err(ConfigurationError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let mut config = DeskConfig::default();
        config.api.base_url = Some("http://10.0.0.5:8000/api".to_string());
        assert_eq!(config.resolved_base_url().unwrap().as_str(), "http://10.0.0.5:8000/api/");
    }

    #[test]
    fn test_env_overrides_base_url() {
        let config = ConfigLoader::new()
            .load_with_env(env_of(&[(ENV_API_URL, "http://staging:5000/api/")]))
            .unwrap();
        assert_eq!(config.resolved_base_url().unwrap().as_str(), "http://staging:5000/api/");
    }

    #[test]
    fn test_env_invalid_concurrency() {
        let result = ConfigLoader::new().load_with_env(env_of(&[(ENV_IMAGE_CONCURRENCY, "many")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_environment_switch() {
        let config = ConfigLoader::new()
            .load_with_env(env_of(&[
                (ENV_ENVIRONMENT, "production"),
                (ENV_API_ORIGIN, "https://desk.example.org"),
            ]))
            .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.resolved_base_url().unwrap().as_str(), "https://desk.example.org/api/");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = DeskConfig::default();
        config.export.image_concurrency = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_cache_ttl_rejected() {
        let mut config = DeskConfig::default();
        config.cache.ttl_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("cache.ttl_secs"));
    }

    #[test]
    fn test_save_and_load_config() -> DeskResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        let mut original = DeskConfig::default();
        original.export.image_concurrency = 8;
        original.api.token_path = Some("/tmp/desk-token".to_string());

        ConfigLoader::new().save(&original, path)?;
        let loaded = ConfigLoader::new().with_path(path).load_with_env(|_| None)?;

        assert_eq!(loaded.export.image_concurrency, 8);
        assert_eq!(loaded.token_path(), PathBuf::from("/tmp/desk-token"));
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> DeskResult<()> {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[cache]\nttl_secs = 5\n").unwrap();

        let loaded = ConfigLoader::new().with_path(temp_file.path()).load_with_env(|_| None)?;
        assert_eq!(loaded.cache.ttl_secs, 5);
        assert_eq!(loaded.cache.capacity, 512);
        assert_eq!(loaded.api.timeout_secs, 30);
        Ok(())
    }
}
