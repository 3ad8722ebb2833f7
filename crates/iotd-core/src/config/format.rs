use std::path::Path;

use serde::de::DeserializeOwned;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::config::error::ConfigError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Like [`ConfigFormat::from_path`], but an unknown extension is an error
    pub fn require_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))
    }

    pub fn deserialize<T: DeserializeOwned>(&self, data: &str) -> Result<T, ConfigError> {
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| self.deserialization_error(e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| self.deserialization_error(e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| self.deserialization_error(e)),
        }
    }

    fn deserialization_error<E>(&self, source: E) -> ConfigError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::Deserialization {
            format: self.extension().to_string(),
            source: Box::new(source),
        }
    }
}

/// Read and decode a settings file, picking the format from its extension
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = ConfigFormat::require_from_path(path)?;
    let data = std::fs::read_to_string(path).map_err(|e| ConfigError::io(e, path))?;
    format.deserialize(&data)
}
