//! # iotd Core Kernel Errors
//!
//! [`Error`] aggregates the subsystem errors ([`NodeError`], [`RegistryError`],
//! [`PluginSystemError`], [`ConfigError`], [`FrontendError`]) and adds
//! lifecycle failures of kernel components.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::frontend::FrontendError;
use crate::node::NodeError;
use crate::plugin_system::PluginSystemError;
use crate::registry::RegistryError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Front-end error: {0}")]
    Frontend(#[from] FrontendError),

    /// A component failed during a specific lifecycle phase
    #[error("Kernel lifecycle error during {phase:?}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        component_name: Option<String>,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },
}

/// Phase of the server lifecycle an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Start")]
    Start,
    #[error("Reconfigure")]
    Reconfigure,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    pub fn lifecycle(
        phase: KernelLifecyclePhase,
        component_name: impl Into<String>,
        message: impl Into<String>,
        source: Option<Error>,
    ) -> Self {
        Error::KernelLifecycleError {
            phase,
            component_name: Some(component_name.into()),
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}
