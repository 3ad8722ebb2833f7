use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use log::debug;
use parking_lot::RwLock;

use crate::node::Node;
use crate::registry::error::RegistryError;
use crate::registry::store::NodeRegistry;

/// Write handle to the [`NodeRegistry`] handed to one getter.
///
/// Clones share the same gate: once any clone is [revoked](NodeWriter::revoke),
/// every clone rejects writes. `revoke` waits for writes already in progress,
/// so after it returns nothing more can land in the registry through this
/// handle, however late the getter's task notices it was cancelled.
#[derive(Clone)]
pub struct NodeWriter {
    owner: Arc<str>,
    registry: Arc<NodeRegistry>,
    open: Arc<RwLock<bool>>,
}

impl NodeWriter {
    pub fn new(registry: Arc<NodeRegistry>, owner: impl Into<String>) -> Self {
        Self {
            owner: Arc::from(owner.into()),
            registry,
            open: Arc::new(RwLock::new(true)),
        }
    }

    /// Id of the getter this handle belongs to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn with_open<R>(&self, operation: &'static str, write: impl FnOnce(&NodeRegistry) -> R) -> Result<R, RegistryError> {
        let open = self.open.read();
        if !*open {
            debug!("Dropping {} from '{}': writer revoked", operation, self.owner);
            return Err(RegistryError::WriterRevoked {
                owner: self.owner.to_string(),
                operation,
            });
        }
        Ok(write(&self.registry))
    }

    pub fn upsert(&self, node: Node) -> Result<Option<Arc<Node>>, RegistryError> {
        self.with_open("upsert", |registry| registry.upsert(node))
    }

    pub fn update<F>(&self, id: &str, mutate: F) -> Result<bool, RegistryError>
    where
        F: FnOnce(&mut Node),
    {
        self.with_open("update", |registry| registry.update(id, mutate))
    }

    pub fn touch(&self, id: &str, time: DateTime<Local>) -> Result<bool, RegistryError> {
        self.with_open("touch", |registry| registry.touch(id, time))
    }

    pub fn remove(&self, id: &str) -> Result<Option<Arc<Node>>, RegistryError> {
        self.with_open("remove", |registry| registry.remove(id))
    }

    /// Read through to the registry. Reads are never gated.
    pub fn get(&self, id: &str) -> Option<Arc<Node>> {
        self.registry.get(id)
    }

    /// Close the handle for good. Blocks until in-flight writes finish.
    pub fn revoke(&self) {
        let mut open = self.open.write();
        *open = false;
    }

    pub fn is_revoked(&self) -> bool {
        !*self.open.read()
    }
}

impl fmt::Debug for NodeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeWriter")
            .field("owner", &self.owner)
            .field("revoked", &self.is_revoked())
            .finish_non_exhaustive()
    }
}
