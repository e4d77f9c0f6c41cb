use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::provider::Provider;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub gateway_url: Option<String>,
    pub gateway_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub ollama_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some(Provider::Gateway.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Load the user config, falling back to defaults when there is none,
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    /// Write a default config file for the user to fill in, unless one
    /// already exists. Returns the path when a file was created.
    pub fn write_template() -> Result<Option<PathBuf>, ConfigError> {
        let path = Self::get_config_path()?;
        Ok(Self::write_template_to(&path)?.then_some(path))
    }

    pub fn write_template_to(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        Self::new().save_to(path)?;
        Ok(true)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Environment variables win over the file
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut Option<String>); 7] = [
            ("REPLYWISE_PROVIDER", &mut self.provider),
            ("REPLYWISE_MODEL", &mut self.model),
            ("REPLYWISE_GATEWAY_URL", &mut self.gateway_url),
            ("REPLYWISE_GATEWAY_KEY", &mut self.gateway_key),
            ("OPENAI_API_KEY", &mut self.openai_api_key),
            ("OPENAI_BASE_URL", &mut self.openai_base_url),
            ("OLLAMA_HOST", &mut self.ollama_url),
        ];

        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        }
    }

    pub fn provider(&self) -> Result<Provider, ConfigError> {
        match &self.provider {
            Some(name) => {
                Provider::from_str(name).ok_or_else(|| ConfigError::UnknownProvider(name.clone()))
            }
            None => Ok(Provider::Gateway),
        }
    }

    /// Configured model, or the provider's default
    pub fn model_for(&self, provider: Provider) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("replywise").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.provider().unwrap(), Provider::Gateway);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            provider: Some("ollama".to_string()),
            model: Some("mistral".to_string()),
            request_timeout_secs: Some(30),
            ..Config::new()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider().unwrap(), Provider::Ollama);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_template_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replywise").join("config.json");

        assert!(Config::write_template_to(&path).unwrap());
        assert_eq!(Config::load_from(&path).unwrap(), Config::new());

        let edited = Config {
            gateway_url: Some("https://example.test/reply".to_string()),
            ..Config::new()
        };
        edited.save_to(&path).unwrap();

        // an existing file is never overwritten
        assert!(!Config::write_template_to(&path).unwrap());
        assert_eq!(Config::load_from(&path).unwrap(), edited);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("REPLYWISE_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-test"),
            ("REPLYWISE_MODEL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config {
            model: Some("gpt-4o".to_string()),
            ..Config::new()
        };
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.provider().unwrap(), Provider::OpenAI);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        // blank values do not clear the file setting
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_unknown_provider() {
        let config = Config {
            provider: Some("carrier-pigeon".to_string()),
            ..Config::new()
        };
        assert!(matches!(
            config.provider(),
            Err(ConfigError::UnknownProvider(name)) if name == "carrier-pigeon"
        ));
    }

    #[test]
    fn test_model_defaults_per_provider() {
        let config = Config::new();
        assert_eq!(config.model_for(Provider::Ollama), "llama3.2:latest");
        assert_eq!(config.model_for(Provider::OpenAI), "gpt-4o-mini");
    }
}
