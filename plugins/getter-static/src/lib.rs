//! # Static node getter
//!
//! Publishes a fixed list of nodes, declared in its settings or config file,
//! and re-publishes them every `heartbeat_ms` so they never go stale.
//! Takes new configuration only while stopped ([`ReloadMode::Restart`]).
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use iotd_core::config::SimpleSettings;
use iotd_core::node::{Node, NodeError, NodeItem, NodeStatus};
use iotd_core::registry::NodeWriter;
use iotd_core::{DataGetter, GetterCatalog, GetterContext, PluginSystemError, ReloadMode};

/// Catalog type name of this getter
pub const STATIC_TYPE: &str = "static";

/// Class given to configured nodes that do not name one
pub const STATIC_CLASS: &str = "StaticNode";

const DEFAULT_HEARTBEAT_MS: u64 = 5000;

/// Register this getter type in `catalog`
pub fn register(catalog: &mut GetterCatalog) -> Result<(), PluginSystemError> {
    catalog.register(STATIC_TYPE, || Box::new(StaticNodeGetter::new()) as Box<dyn DataGetter>)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemSpec {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub status: String,
}

/// One node as written in configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub name: Option<String>,
    pub class: Option<String>,
    pub group: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub items: Vec<ItemSpec>,
}

impl NodeSpec {
    pub fn build(&self) -> Result<Node, NodeError> {
        let class = self.class.as_deref().unwrap_or(STATIC_CLASS);
        let mut builder = Node::builder(self.id.as_str())
            .class_name(class)
            .attributes(self.attributes.clone());
        if let Some(name) = &self.name {
            builder = builder.name(name.as_str());
        }
        if let Some(group) = &self.group {
            builder = builder.group_name(group.as_str());
        }
        if let Some(status) = &self.status {
            builder = builder.status(status.parse::<NodeStatus>()?);
        }
        for item in &self.items {
            builder = builder.item(NodeItem::new(
                item.name.as_str(),
                item.value.as_str(),
                item.status.as_str(),
            ));
        }
        builder.build()
    }
}

/// Resolved configuration: the nodes to publish and how often
#[derive(Debug, Clone, PartialEq)]
pub struct StaticConfig {
    pub heartbeat: Duration,
    pub nodes: Vec<Node>,
}

impl StaticConfig {
    fn from_settings(getter_id: &str, settings: &SimpleSettings) -> Result<Self, String> {
        let heartbeat_ms = settings.get_or("heartbeat_ms", DEFAULT_HEARTBEAT_MS);
        if heartbeat_ms == 0 {
            return Err("heartbeat_ms must be positive".to_string());
        }
        let specs: Vec<NodeSpec> = match settings.get::<serde_json::Value>("nodes") {
            Some(raw) => serde_json::from_value(raw).map_err(|e| format!("invalid 'nodes': {}", e))?,
            None => Vec::new(),
        };
        let nodes = specs
            .iter()
            .map(|spec| spec.build().map_err(|e| format!("node '{}': {}", spec.id, e)))
            .collect::<Result<Vec<_>, _>>()?;
        if nodes.is_empty() {
            warn!("Static getter '{}' has no nodes configured", getter_id);
        }
        Ok(Self {
            heartbeat: Duration::from_millis(heartbeat_ms),
            nodes,
        })
    }
}

pub struct StaticNodeGetter {
    getter_id: String,
    settings: SimpleSettings,
    config: Option<StaticConfig>,
    writer: Option<NodeWriter>,
    cancel: CancellationToken,
    run: Option<(CancellationToken, JoinHandle<()>)>,
}

impl StaticNodeGetter {
    pub fn new() -> Self {
        Self {
            getter_id: String::new(),
            settings: SimpleSettings::new(),
            config: None,
            writer: None,
            cancel: CancellationToken::new(),
            run: None,
        }
    }

    pub fn config(&self) -> Option<&StaticConfig> {
        self.config.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Inline settings overlaid with the contents of `path`
    fn resolve(&self, path: Option<&Path>) -> Result<StaticConfig, String> {
        let mut settings = self.settings.clone();
        if let Some(path) = path {
            settings.merge(&SimpleSettings::load(path).map_err(|e| e.to_string())?);
        }
        StaticConfig::from_settings(&self.getter_id, &settings)
    }
}

impl Default for StaticNodeGetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for StaticNodeGetter {
    fn drop(&mut self) {
        if let Some((token, _)) = self.run.take() {
            token.cancel();
        }
    }
}

async fn heartbeat(writer: NodeWriter, config: StaticConfig, token: CancellationToken) {
    let mut ticker = tokio::time::interval(config.heartbeat);
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                for node in &config.nodes {
                    let mut node = node.clone();
                    node.touch();
                    if writer.upsert(node).is_err() {
                        return;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl DataGetter for StaticNodeGetter {
    fn type_name(&self) -> &'static str {
        STATIC_TYPE
    }

    fn reload_mode(&self) -> ReloadMode {
        ReloadMode::Restart
    }

    async fn initialize(&mut self, ctx: GetterContext) -> Result<(), PluginSystemError> {
        self.getter_id = ctx.getter_id.clone();
        self.settings = ctx.settings.clone();
        let config = self
            .resolve(ctx.config_path.as_deref())
            .map_err(|message| PluginSystemError::initialization(&ctx.getter_id, message))?;
        info!(
            "Static getter '{}' ready: {} node(s), heartbeat {:?}",
            ctx.getter_id,
            config.nodes.len(),
            config.heartbeat
        );
        self.config = Some(config);
        self.writer = Some(ctx.writer);
        self.cancel = ctx.cancel;
        Ok(())
    }

    async fn update_config(&mut self, path: &Path) -> Result<(), PluginSystemError> {
        if self.is_running() {
            return Err(PluginSystemError::reconfiguration(
                &self.getter_id,
                "configuration can only change while stopped",
            ));
        }
        if self.config.is_none() {
            return Err(PluginSystemError::reconfiguration(&self.getter_id, "not initialized"));
        }
        let config = self
            .resolve(Some(path))
            .map_err(|message| PluginSystemError::reconfiguration(&self.getter_id, message))?;
        // Nodes dropped from the configuration leave the registry too
        if let (Some(writer), Some(old)) = (&self.writer, &self.config) {
            for node in &old.nodes {
                if !config.nodes.iter().any(|n| n.id() == node.id()) {
                    if let Err(e) = writer.remove(node.id()) {
                        debug!("Could not drop static node '{}': {}", node.id(), e);
                    }
                }
            }
        }
        self.config = Some(config);
        Ok(())
    }

    async fn start(&mut self) -> bool {
        if self.is_running() {
            return true;
        }
        let (Some(writer), Some(config)) = (self.writer.clone(), self.config.clone()) else {
            warn!("Static getter started before initialize");
            return false;
        };
        let token = self.cancel.child_token();
        let handle = tokio::spawn(heartbeat(writer, config, token.clone()));
        self.run = Some((token, handle));
        true
    }

    async fn stop(&mut self) -> Result<(), PluginSystemError> {
        let Some((token, handle)) = self.run.take() else {
            return Ok(());
        };
        token.cancel();
        handle
            .await
            .map_err(|e| PluginSystemError::shutdown(&self.getter_id, e.to_string()))
    }
}
