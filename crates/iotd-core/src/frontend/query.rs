use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;

use crate::frontend::error::FrontendError;
use crate::kernel::component::KernelComponent;
use crate::kernel::constants;
use crate::kernel::error::Result;
use crate::node::{Node, nodes_to_markup, nodes_to_object};
use crate::registry::NodeRegistry;

/// In-process query surface over the node registry.
///
/// Answers are only given between `start` and `stop`; a transport (HTTP or
/// otherwise) sits on top of this and is bound to [`QueryService::port`].
pub struct QueryService {
    name: &'static str,
    port: u16,
    registry: Arc<NodeRegistry>,
    running: AtomicBool,
}

impl QueryService {
    pub fn new(registry: Arc<NodeRegistry>, port: u16) -> Self {
        Self {
            name: constants::QUERY_SERVICE_NAME,
            port,
            registry,
            running: AtomicBool::new(false),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn ensure_running(&self) -> std::result::Result<(), FrontendError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(FrontendError::NotRunning { port: self.port })
        }
    }

    fn node(&self, id: &str) -> std::result::Result<Arc<Node>, FrontendError> {
        self.ensure_running()?;
        self.registry
            .get(id)
            .ok_or_else(|| FrontendError::NotFound(id.to_string()))
    }

    /// Markup of one node
    pub fn node_markup(&self, id: &str) -> std::result::Result<String, FrontendError> {
        debug!("Markup query for node '{}'", id);
        Ok(self.node(id)?.to_markup())
    }

    /// Structured object of one node
    pub fn node_object(&self, id: &str) -> std::result::Result<Value, FrontendError> {
        debug!("Object query for node '{}'", id);
        Ok(self.node(id)?.to_object())
    }

    /// Every node, ordered by id, inside a `<Nodes>` element
    pub fn nodes_markup(&self) -> std::result::Result<String, FrontendError> {
        self.ensure_running()?;
        Ok(nodes_to_markup(&self.registry.list_all()))
    }

    /// Every node, ordered by id, as an array
    pub fn nodes_object(&self) -> std::result::Result<Value, FrontendError> {
        self.ensure_running()?;
        Ok(nodes_to_object(&self.registry.list_all()))
    }

    pub fn node_ids(&self) -> std::result::Result<Vec<String>, FrontendError> {
        self.ensure_running()?;
        Ok(self.registry.ids())
    }
}

impl fmt::Debug for QueryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryService")
            .field("port", &self.port)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KernelComponent for QueryService {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.running.swap(true, Ordering::AcqRel) {
            info!("Query service accepting requests for port {}", self.port);
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("Query service on port {} stopped", self.port);
        }
        Ok(())
    }
}
