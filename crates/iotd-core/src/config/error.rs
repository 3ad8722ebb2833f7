//! # iotd Core Configuration Errors
//!
//! Defines [`ConfigError`], raised while locating, reading or decoding the
//! server settings file and per-getter settings files.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
