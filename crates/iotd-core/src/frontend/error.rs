//! # iotd Core Front-end Errors
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrontendError {
    #[error("Query service on port {port} is not running")]
    NotRunning { port: u16 },

    #[error("Node '{0}' not found")]
    NotFound(String),
}
