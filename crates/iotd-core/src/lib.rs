//! # iotd Core
//!
//! Library side of the iotd data server: the node model and its two
//! serializations, the shared node registry, the getter plugin system, the
//! query front-end and the [`DataServer`] facade that runs them.
pub mod config;
pub mod frontend;
pub mod kernel;
pub mod node;
pub mod plugin_system;
pub mod registry;

pub use config::{GetterSetting, ServerSettings, SimpleSettings};
pub use frontend::{FrontendError, QueryService};
pub use kernel::error::Error as KernelError;
pub use kernel::{DataServer, KernelComponent};
pub use node::{Node, NodeItem, NodeStatus, PinObject};
pub use plugin_system::{
    DataGetter, DataGetterManager, GetterCatalog, GetterContext, GetterState, LifecycleReport, PluginSystemError,
    ReloadMode,
};
pub use registry::{NodeRegistry, NodeWriter};

#[cfg(test)]
mod tests;
