//! Configuration structures for the extraction pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

/// Main configuration for tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// Completion provider configuration.
    pub provider: ProviderConfig,

    /// Extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Completion provider configuration.
///
/// The credential itself is never stored here; only the name of the
/// environment variable it is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Model identifier.
    pub model: String,

    /// API root of an OpenAI-compatible service.
    pub base_url: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            temperature: 0.0,
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Document type used when none is given.
    pub document_type: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            document_type: "receipt".to_string(),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values no request could succeed with.
    pub fn check(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            return Err(TallyError::Config("provider.model is empty".to_string()));
        }
        if self.provider.timeout_secs == 0 {
            return Err(TallyError::Config(
                "provider.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(TallyError::Config(format!(
                "provider.temperature {} is outside 0.0 to 2.0",
                self.provider.temperature
            )));
        }
        Ok(())
    }

    /// Default location, `<config dir>/tally/config.json`.
    pub fn default_path(config_dir: Option<PathBuf>) -> PathBuf {
        config_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = TallyConfig::default();
        assert_eq!(config.provider.model, "gpt-4.1");
        assert_eq!(config.provider.timeout(), Duration::from_secs(60));
        assert_eq!(config.extraction.document_type, "receipt");
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"provider": {"model": "gpt-4o-mini"}}"#).unwrap();

        let config = TallyConfig::from_file(&path).unwrap();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TallyConfig::default();
        config.provider.timeout_secs = 15;
        config.save(&path).unwrap();

        assert_eq!(TallyConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"provider": {"timeout_secs": 0}}"#).unwrap();

        assert!(matches!(
            TallyConfig::from_file(&path),
            Err(TallyError::Config(_))
        ));
    }

    #[test]
    fn test_default_path() {
        let path = TallyConfig::default_path(Some(PathBuf::from("/home/u/.config")));
        assert_eq!(path, PathBuf::from("/home/u/.config/tally/config.json"));
    }
}
