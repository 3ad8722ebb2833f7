//! # iotd Core Kernel
//!
//! The `kernel` module holds the pieces that tie the data server together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Server facade**: [`DataServer`](bootstrap::DataServer) owns the node
//!   registry, builds the getter manager and query front-end, and runs them
//!   in order.
//! - **Component lifecycle**: the [`KernelComponent`](component::KernelComponent)
//!   trait implemented by the manager and the front-end.
//! - **Core Constants**: application name, version and component names.
//! - **Error Handling**: the aggregate [`Error`](error::Error) and its
//!   `Result` alias.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

pub use bootstrap::DataServer;
pub use component::KernelComponent;
pub use error::{Error, KernelLifecyclePhase, Result};
