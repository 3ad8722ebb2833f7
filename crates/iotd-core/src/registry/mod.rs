//! # iotd Core Node Registry
//!
//! The single source of truth for live nodes. One [`NodeRegistry`] is built
//! by the [`DataServer`](crate::kernel::DataServer) and shared as
//! `Arc<NodeRegistry>`: getters write through their own [`NodeWriter`], the
//! query front-end reads with [`NodeRegistry::get`] and
//! [`NodeRegistry::list_all`].
//!
//! - **[`store`]**: the sharded map of `Arc<Node>` snapshots.
//! - **[`writer`]**: per-getter revocable write handles.
//! - **[`error`]**: [`RegistryError`].
pub mod error;
pub mod store;
pub mod writer;

pub use error::RegistryError;
pub use store::NodeRegistry;
pub use writer::NodeWriter;
