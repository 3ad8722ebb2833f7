//! # iotd Core Node Errors
//!
//! Defines error types specific to the node data model.
//!
//! Most of these never reach a caller of the public best-effort API: reserved
//! attribute keys are logged and dropped, and serialization failures degrade
//! to an empty result. They surface from the lower-level, composable entry
//! points such as [`Node::write_markup`](crate::node::Node::write_markup) and
//! the [`NodeIdentity`](crate::node::NodeIdentity) readers.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Node id must not be empty")]
    EmptyId,

    #[error("'{0}' is a reserved word")]
    ReservedWord(String),

    #[error("Markup serialization failed for node '{node_id}': {message}")]
    Markup {
        node_id: String,
        message: String,
    },

    #[error("Invalid markup attribute name '{name}' on node '{node_id}'")]
    InvalidMarkupName {
        node_id: String,
        name: String,
    },

    #[error("Unknown node status '{0}'")]
    UnknownStatus(String),

    #[error("Cannot read node identity: {0}")]
    Identity(String),
}

impl NodeError {
    pub fn markup(node_id: impl Into<String>, source: impl std::fmt::Display) -> Self {
        NodeError::Markup {
            node_id: node_id.into(),
            message: source.to_string(),
        }
    }
}
