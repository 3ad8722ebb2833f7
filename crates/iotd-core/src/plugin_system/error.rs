//! # iotd Core Plugin System Errors
//!
//! [`PluginSystemError`] covers every way a getter can fail inside the
//! manager: type resolution against the catalog, initialization, start,
//! shutdown and reconfiguration, plus misuse such as duplicate ids or calls
//! made in the wrong [`GetterState`].
use crate::config::ConfigError;
use crate::plugin_system::traits::GetterState;
use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("No getter type '{type_name}' registered (getter '{getter_id}')")]
    Resolution {
        getter_id: String,
        type_name: String,
    },

    #[error("Getter initialization error for '{getter_id}': {message}")]
    Initialization {
        getter_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Getter start error for '{getter_id}': {message}")]
    Start {
        getter_id: String,
        message: String,
    },

    #[error("Getter shutdown error for '{getter_id}': {message}")]
    Shutdown {
        getter_id: String,
        message: String,
    },

    #[error("Getter reconfiguration error for '{getter_id}': {message}")]
    Reconfiguration {
        getter_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Duplicate getter id '{0}'")]
    DuplicateGetter(String),

    #[error("Unknown getter '{0}'")]
    UnknownGetter(String),

    #[error("Getter '{getter_id}' cannot {operation} while {state}")]
    InvalidState {
        getter_id: String,
        state: GetterState,
        operation: &'static str,
    },

    #[error("Required getter(s) failed: {}", .0.join(", "))]
    RequiredGettersFailed(Vec<String>),

    #[error("Getter catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PluginSystemError {
    pub fn initialization(getter_id: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::Initialization {
            getter_id: getter_id.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn reconfiguration(getter_id: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::Reconfiguration {
            getter_id: getter_id.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn shutdown(getter_id: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::Shutdown {
            getter_id: getter_id.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(getter_id: impl Into<String>, state: GetterState, operation: &'static str) -> Self {
        PluginSystemError::InvalidState {
            getter_id: getter_id.into(),
            state,
            operation,
        }
    }
}
