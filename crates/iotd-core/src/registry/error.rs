//! # iotd Core Registry Errors
//!
//! The registry itself cannot fail: every read and write on
//! [`NodeRegistry`](crate::registry::NodeRegistry) is infallible. The only
//! error is a write attempted through a revoked
//! [`NodeWriter`](crate::registry::NodeWriter).
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Writer for '{owner}' is revoked, {operation} rejected")]
    WriterRevoked {
        owner: String,
        operation: &'static str,
    },
}
