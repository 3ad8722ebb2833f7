//! # iotd Core Plugin System
//!
//! Runs the data-source plugins ("getters") that feed the node registry.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`DataGetter`] contract, its [`GetterContext`],
//!   [`ReloadMode`] and the [`GetterState`] machine.
//! - **[`catalog`]**: [`GetterCatalog`], the explicit type-name → factory
//!   table getters are resolved from.
//! - **[`manager`]**: [`DataGetterManager`], which initializes, starts, stops
//!   and reconfigures every configured getter, containing failures per
//!   getter.
//! - **[`report`]**: [`LifecycleReport`] and [`GetterFailure`] describing the
//!   outcome of group operations.
//! - **[`error`]**: [`PluginSystemError`].
pub mod catalog;
pub mod error;
pub mod manager;
pub mod report;
pub mod traits;

pub use catalog::{GetterCatalog, GetterFactory};
pub use error::PluginSystemError;
pub use manager::DataGetterManager;
pub use report::{GetterFailure, LifecyclePhase, LifecycleReport};
pub use traits::{DataGetter, GetterContext, GetterState, ReloadMode};
