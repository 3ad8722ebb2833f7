use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::node::error::NodeError;

/// Status of a node as last reported by its getter.
///
/// Rendered by variant name in both serialization formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    None,
    Ok,
    Warning,
    Error,
    Offline,
}

impl NodeStatus {
    /// All statuses in declaration order
    pub const ALL: [NodeStatus; 5] = [
        NodeStatus::None,
        NodeStatus::Ok,
        NodeStatus::Warning,
        NodeStatus::Error,
        NodeStatus::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::None => "None",
            NodeStatus::Ok => "Ok",
            NodeStatus::Warning => "Warning",
            NodeStatus::Error => "Error",
            NodeStatus::Offline => "Offline",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeStatus {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NodeStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| NodeError::UnknownStatus(s.to_string()))
    }
}
