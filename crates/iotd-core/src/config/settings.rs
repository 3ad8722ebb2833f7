use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::config::format::{ConfigFormat, load_file};

/// Default port of the query front-end
pub const DEFAULT_SERVICE_PORT: u16 = 8080;

/// Free-form key/value settings handed to a getter at initialize time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleSettings {
    /// Raw configuration values
    #[serde(flatten)]
    values: HashMap<String, serde_json::Value>,
}

impl SimpleSettings {
    /// Create a new empty settings map
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create settings from a HashMap
    pub fn from_hashmap(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Load settings from a JSON/YAML/TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_file(path)
    }

    /// Get a typed value; `None` if missing or of the wrong shape
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a typed value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::Invalid(format!("Failed to serialize setting '{}': {}", key, e)))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Builder-style [`SimpleSettings::set`] for values that always serialize
    pub fn with(mut self, key: &str, value: serde_json::Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with other settings, overriding existing values
    pub fn merge(&mut self, other: &SimpleSettings) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}

/// One configured getter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetterSetting {
    /// Unique id of this getter instance
    pub id: String,
    /// Catalog type name used to resolve the implementation
    #[serde(rename = "type")]
    pub type_name: String,
    /// Getter-specific config file, also used for later reconfiguration
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    #[serde(default)]
    pub test_mode: bool,
    /// Whether a failure of this getter fails the whole server start
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub settings: SimpleSettings,
}

impl GetterSetting {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            config_path: None,
            test_mode: false,
            required: false,
            settings: SimpleSettings::new(),
        }
    }

    pub fn with_settings(mut self, settings: SimpleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

fn default_service_port() -> u16 {
    DEFAULT_SERVICE_PORT
}

/// Top-level settings of the data server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    /// Nodes not observed for this long are evicted by the periodic sweep
    #[serde(default)]
    pub stale_after_secs: Option<u64>,
    #[serde(default)]
    pub getters: Vec<GetterSetting>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            service_port: DEFAULT_SERVICE_PORT,
            stale_after_secs: None,
            getters: Vec::new(),
        }
    }
}

impl ServerSettings {
    /// Load and validate settings from a JSON/YAML/TOML file.
    ///
    /// Relative getter `config_path`s are resolved against the directory of
    /// the settings file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut settings: ServerSettings = load_file(path)?;
        if let Some(base) = path.parent() {
            for getter in &mut settings.getters {
                if let Some(config_path) = getter.config_path.as_mut() {
                    if config_path.is_relative() {
                        *config_path = base.join(&*config_path);
                    }
                }
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Decode and validate settings from a string in the given format
    pub fn from_str(data: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let settings: ServerSettings = format.deserialize(data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Structural checks only; unknown getter types are reported later by
    /// the manager as per-getter failures.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for getter in &self.getters {
            if getter.id.trim().is_empty() {
                return Err(ConfigError::Invalid("getter id must not be empty".to_string()));
            }
            if getter.type_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("getter '{}' has no type", getter.id)));
            }
            if !seen.insert(getter.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate getter id '{}'", getter.id)));
            }
        }
        Ok(())
    }
}
