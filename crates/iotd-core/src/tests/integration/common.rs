#![cfg(test)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SimpleSettings;
use crate::node::{Node, NodeItem};
use crate::plugin_system::{DataGetter, GetterCatalog, GetterContext, PluginSystemError, ReloadMode};

pub const STAMPING_TYPE: &str = "stamping";

/// Writes its own node plus a node shared with every other stamping getter.
/// Every field of a written node carries the same stamp, so a reader can
/// detect a node mixed from two writes. `label` can be hot-reloaded from a
/// JSON file.
pub struct StampingGetter {
    ctx: Option<GetterContext>,
    label: Option<watch::Sender<String>>,
    run: Option<(CancellationToken, JoinHandle<()>)>,
}

impl StampingGetter {
    pub fn new() -> Self {
        Self {
            ctx: None,
            label: None,
            run: None,
        }
    }
}

pub fn stamped(id: &str, stamp: &str) -> Node {
    Node::builder(id)
        .name(format!("name-{}", stamp))
        .group_name(format!("group-{}", stamp))
        .attribute("stamp", stamp)
        .item(NodeItem::new("stamp", stamp, "ok"))
        .build()
        .unwrap()
}

pub fn is_consistent(node: &Node) -> bool {
    let Some(stamp) = node.attribute("stamp") else {
        return false;
    };
    node.name() == format!("name-{}", stamp)
        && node.group_name() == format!("group-{}", stamp)
        && node.item("stamp").map(|i| i.value()) == Some(stamp)
}

#[async_trait]
impl DataGetter for StampingGetter {
    fn type_name(&self) -> &'static str {
        STAMPING_TYPE
    }

    fn reload_mode(&self) -> ReloadMode {
        ReloadMode::HotReload
    }

    async fn initialize(&mut self, ctx: GetterContext) -> Result<(), PluginSystemError> {
        let label = ctx.settings.get_or("label", ctx.getter_id.clone());
        self.label = Some(watch::channel(label).0);
        self.ctx = Some(ctx);
        Ok(())
    }

    async fn update_config(&mut self, path: &Path) -> Result<(), PluginSystemError> {
        let settings = SimpleSettings::load(path)?;
        let Some(label) = settings.get::<String>("label") else {
            return Err(PluginSystemError::reconfiguration("stamping", "missing 'label'"));
        };
        if let Some(tx) = &self.label {
            tx.send_replace(label);
        }
        Ok(())
    }

    async fn start(&mut self) -> bool {
        let (Some(ctx), Some(label_tx)) = (self.ctx.as_ref(), self.label.as_ref()) else {
            return false;
        };
        let token = ctx.cancel.child_token();
        let writer = ctx.writer.clone();
        let id = ctx.getter_id.clone();
        let label = label_tx.subscribe();
        let run_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut round: u64 = 0;
            loop {
                tokio::select! {
                    _ = run_token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(1)) => {
                        round += 1;
                        let current = label.borrow().clone();
                        let stamp = format!("{}-{}-{}", id, current, round);
                        let _ = writer.upsert(stamped(&id, &stamp));
                        let _ = writer.upsert(stamped("shared", &stamp));
                    }
                }
            }
        });
        self.run = Some((token, handle));
        true
    }

    async fn stop(&mut self) -> Result<(), PluginSystemError> {
        if let Some((token, handle)) = self.run.take() {
            token.cancel();
            let _ = handle.await;
        }
        Ok(())
    }
}

pub fn stamping_catalog() -> GetterCatalog {
    let mut catalog = GetterCatalog::new();
    catalog
        .register(STAMPING_TYPE, || Box::new(StampingGetter::new()) as Box<dyn DataGetter>)
        .unwrap();
    catalog
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

pub async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
