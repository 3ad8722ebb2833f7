//! # iotd Core Query Front-end
//!
//! [`QueryService`] exposes the registry read interface (single node or all
//! nodes, as markup or structured object) as a [`KernelComponent`]. Queries
//! are refused with [`FrontendError::NotRunning`] outside `start`/`stop`.
//!
//! [`KernelComponent`]: crate::kernel::KernelComponent
pub mod error;
pub mod query;

pub use error::FrontendError;
pub use query::QueryService;

#[cfg(test)]
mod tests;
