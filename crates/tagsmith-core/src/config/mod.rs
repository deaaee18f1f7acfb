//! Configuration management for Tagsmith.
//!
//! Configuration is loaded from the platform config directory with sensible defaults.
//! Every constant of the tagging pipeline (bounds, top-k cutoff, normalization,
//! background fill, default threshold) lives here so tests can vary it.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Tagsmith.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Model and catalog file locations
    pub model: ModelConfig,

    /// Image-to-tensor preprocessing
    pub preprocess: PreprocessConfig,

    /// Ranking and threshold settings
    pub tagging: TaggingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Batch processing settings
    pub batch: BatchConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.tagsmith.tagsmith/config.toml
    /// - Linux: ~/.config/tagsmith/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\tagsmith\config\config.toml
    ///
    /// Falls back to ~/.tagsmith/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "tagsmith", "tagsmith")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".tagsmith").join("config.toml")
            })
    }

    /// Get the resolved model directory path (with ~ expansion).
    pub fn model_dir(&self) -> PathBuf {
        let path_str = self.general.model_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Path of the ONNX tagger model: `{model_dir}/{name}/{model_file}`.
    pub fn model_path(&self) -> PathBuf {
        self.model_dir()
            .join(&self.model.name)
            .join(&self.model.model_file)
    }

    /// Path of the tag catalog: `{model_dir}/{name}/{catalog_file}`.
    pub fn catalog_path(&self) -> PathBuf {
        self.model_dir()
            .join(&self.model.name)
            .join(&self.model.catalog_file)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.preprocess.height, 384);
        assert_eq!(config.preprocess.width, 384);
        assert_eq!(config.tagging.top_k, 250);
        assert!((config.tagging.threshold - 0.20).abs() < f32::EPSILON);
        assert_eq!(config.batch.parallel_workers, 4);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[preprocess]"));
        assert!(toml.contains("[tagging]"));
    }

    #[test]
    fn test_config_toml_roundtrip_keeps_background() {
        let mut config = Config::default();
        config.preprocess.background = Background::Rgb([1.0, 0.5, 0.0]);
        let toml = config.to_toml().unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(parsed.preprocess.background.rgb(), [1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("[tagging]\nthreshold = 0.35\n").unwrap();
        assert!((config.tagging.threshold - 0.35).abs() < f32::EPSILON);
        assert_eq!(config.tagging.top_k, 250);
        assert_eq!(config.preprocess.height, 384);
    }

    #[test]
    fn test_scalar_background_parses() {
        let config = Config::from_toml("[preprocess]\nbackground = 1.0\n").unwrap();
        assert_eq!(config.preprocess.background.rgb(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tagging]\ntop_k = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_model_and_catalog_paths() {
        let mut config = Config::default();
        config.general.model_dir = PathBuf::from("/opt/models");
        assert_eq!(
            config.model_path(),
            PathBuf::from("/opt/models/jtp-pilot2/model.onnx")
        );
        assert_eq!(
            config.catalog_path(),
            PathBuf::from("/opt/models/jtp-pilot2/tags.json")
        );
    }
}
