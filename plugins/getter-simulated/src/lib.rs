//! # Simulated sensor getter
//!
//! Publishes `node_count` sensor nodes (`<prefix>-<n>`), each with a single
//! `value` item, every `interval_ms`. Readings are random in `[min, max)`; in
//! test mode they come from an RNG seeded with `seed`, so runs repeat.
//!
//! Reconfiguration is applied while running ([`ReloadMode::HotReload`]): the
//! acquisition task picks the new settings up on its next tick.
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use iotd_core::config::SimpleSettings;
use iotd_core::node::{Node, NodeItem, NodeStatus};
use iotd_core::registry::NodeWriter;
use iotd_core::{DataGetter, GetterCatalog, GetterContext, PluginSystemError, ReloadMode};

/// Catalog type name of this getter
pub const SIMULATED_TYPE: &str = "simulated";

/// Register this getter type in `catalog`
pub fn register(catalog: &mut GetterCatalog) -> Result<(), PluginSystemError> {
    catalog.register(SIMULATED_TYPE, || Box::new(SimulatedSensorGetter::new()) as Box<dyn DataGetter>)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub prefix: String,
    pub node_count: usize,
    pub interval_ms: u64,
    pub min: f64,
    pub max: f64,
    /// Readings at or above this are reported with `warn` status
    pub warn_above: Option<f64>,
    pub seed: u64,
}

impl SimulationConfig {
    fn defaults(getter_id: &str) -> Self {
        Self {
            prefix: getter_id.to_string(),
            node_count: 3,
            interval_ms: 1000,
            min: 0.0,
            max: 100.0,
            warn_above: None,
            seed: 42,
        }
    }

    /// Overlay `settings` on top of `self`
    fn merged(&self, settings: &SimpleSettings) -> Self {
        Self {
            prefix: settings.get_or("prefix", self.prefix.clone()),
            node_count: settings.get_or("node_count", self.node_count),
            interval_ms: settings.get_or("interval_ms", self.interval_ms),
            min: settings.get_or("min", self.min),
            max: settings.get_or("max", self.max),
            warn_above: settings.get::<f64>("warn_above").or(self.warn_above),
            seed: settings.get_or("seed", self.seed),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.prefix.trim().is_empty() {
            return Err("prefix must not be empty".to_string());
        }
        if self.interval_ms == 0 {
            return Err("interval_ms must be positive".to_string());
        }
        if !self.min.is_finite() || !self.max.is_finite() || !(self.max - self.min).is_finite() {
            return Err(format!("range [{}, {}) is not finite", self.min, self.max));
        }
        if self.min >= self.max {
            return Err(format!("min ({}) must be below max ({})", self.min, self.max));
        }
        Ok(())
    }

    pub fn node_id(&self, index: usize) -> String {
        format!("{}-{}", self.prefix, index)
    }
}

pub struct SimulatedSensorGetter {
    getter_id: String,
    test_mode: bool,
    writer: Option<NodeWriter>,
    cancel: CancellationToken,
    config: Option<watch::Sender<SimulationConfig>>,
    run: Option<(CancellationToken, JoinHandle<()>)>,
}

impl SimulatedSensorGetter {
    pub fn new() -> Self {
        Self {
            getter_id: String::new(),
            test_mode: false,
            writer: None,
            cancel: CancellationToken::new(),
            config: None,
            run: None,
        }
    }

    /// Configuration currently in effect
    pub fn config(&self) -> Option<SimulationConfig> {
        self.config.as_ref().map(|tx| tx.borrow().clone())
    }

    fn load(&self, base: &SimulationConfig, path: &Path) -> Result<SimulationConfig, PluginSystemError> {
        let settings = SimpleSettings::load(path)?;
        let config = base.merged(&settings);
        config
            .validate()
            .map_err(|message| PluginSystemError::reconfiguration(&self.getter_id, message))?;
        Ok(config)
    }
}

impl Default for SimulatedSensorGetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulatedSensorGetter {
    fn drop(&mut self) {
        if let Some((token, _)) = self.run.take() {
            token.cancel();
        }
    }
}

/// One acquisition pass: a reading per configured node
fn publish(writer: &NodeWriter, config: &SimulationConfig, rng: &mut StdRng) -> bool {
    for index in 0..config.node_count {
        let reading = rng.gen_range(config.min..config.max);
        let status = match config.warn_above {
            Some(limit) if reading >= limit => "warn",
            _ => "ok",
        };
        let node = Node::builder(config.node_id(index))
            .class_name("Sensor")
            .status(NodeStatus::Ok)
            .attribute("source", SIMULATED_TYPE)
            .item(NodeItem::new("value", format!("{:.2}", reading), status))
            .build();
        let node = match node {
            Ok(node) => node,
            Err(e) => {
                warn!("Skipping simulated node: {}", e);
                continue;
            }
        };
        if writer.upsert(node).is_err() {
            return false;
        }
    }
    true
}

async fn acquire(
    writer: NodeWriter,
    mut config: watch::Receiver<SimulationConfig>,
    token: CancellationToken,
    test_mode: bool,
) {
    let current = config.borrow_and_update().clone();
    let mut rng = if test_mode {
        StdRng::seed_from_u64(current.seed)
    } else {
        StdRng::from_entropy()
    };
    let mut active = current;
    let mut ticker = tokio::time::interval(Duration::from_millis(active.interval_ms));

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            changed = config.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = config.borrow_and_update().clone();
                if next.interval_ms != active.interval_ms {
                    ticker = tokio::time::interval(Duration::from_millis(next.interval_ms));
                }
                // Drop nodes the new configuration no longer produces
                for index in 0..active.node_count {
                    let id = active.node_id(index);
                    if index >= next.node_count || next.prefix != active.prefix {
                        if let Err(e) = writer.remove(&id) {
                            debug!("Could not drop simulated node '{}': {}", id, e);
                        }
                    }
                }
                debug!("Simulation for '{}' now {:?}", writer.owner(), next);
                active = next;
            }
            _ = ticker.tick() => {
                if !publish(&writer, &active, &mut rng) {
                    break;
                }
            }
        }
    }
}

#[async_trait]
impl DataGetter for SimulatedSensorGetter {
    fn type_name(&self) -> &'static str {
        SIMULATED_TYPE
    }

    fn reload_mode(&self) -> ReloadMode {
        ReloadMode::HotReload
    }

    async fn initialize(&mut self, ctx: GetterContext) -> Result<(), PluginSystemError> {
        let mut config = SimulationConfig::defaults(&ctx.getter_id).merged(&ctx.settings);
        self.getter_id = ctx.getter_id.clone();
        if let Some(path) = &ctx.config_path {
            config = config.merged(&SimpleSettings::load(path)?);
        }
        config
            .validate()
            .map_err(|message| PluginSystemError::initialization(&ctx.getter_id, message))?;

        info!(
            "Simulated getter '{}' ready: {} node(s) every {}ms",
            ctx.getter_id, config.node_count, config.interval_ms
        );
        self.test_mode = ctx.test_mode;
        self.writer = Some(ctx.writer);
        self.cancel = ctx.cancel;
        self.config = Some(watch::channel(config).0);
        Ok(())
    }

    async fn update_config(&mut self, path: &Path) -> Result<(), PluginSystemError> {
        let Some(tx) = self.config.as_ref() else {
            return Err(PluginSystemError::reconfiguration(&self.getter_id, "not initialized"));
        };
        let base = tx.borrow().clone();
        let next = self.load(&base, path)?;
        info!("Simulated getter '{}' reconfigured from {}", self.getter_id, path.display());
        tx.send_replace(next);
        Ok(())
    }

    async fn start(&mut self) -> bool {
        if self.run.is_some() {
            return true;
        }
        let (Some(writer), Some(config)) = (self.writer.clone(), self.config.as_ref()) else {
            warn!("Simulated getter started before initialize");
            return false;
        };
        let token = self.cancel.child_token();
        let handle = tokio::spawn(acquire(writer, config.subscribe(), token.clone(), self.test_mode));
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
