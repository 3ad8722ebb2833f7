use std::sync::Arc;

use chrono::{DateTime, Local};
use dashmap::DashMap;
use log::debug;

use crate::node::Node;

/// The shared, concurrent store of all live nodes.
///
/// Nodes are held as immutable `Arc<Node>` snapshots keyed by id. Every write
/// swaps the whole snapshot under the per-shard entry lock, so a reader either
/// sees the previous node or the new one, never a mix. Writes to the same id
/// are serialized in call order (last write wins, regardless of the nodes'
/// `updated_time`); writes to ids on different shards do not contend.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: DashMap<String, Arc<Node>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }

    /// Insert or replace a node by id. Returns the snapshot it replaced.
    pub fn upsert(&self, node: Node) -> Option<Arc<Node>> {
        self.upsert_arc(Arc::new(node))
    }

    /// Like [`NodeRegistry::upsert`] for a node that is already shared
    pub fn upsert_arc(&self, node: Arc<Node>) -> Option<Arc<Node>> {
        let id = node.id().to_string();
        self.nodes.insert(id, node)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Node>> {
        self.nodes.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Snapshot of every node, ordered by id.
    ///
    /// Only `Arc` clones are taken while shard locks are held; writers can
    /// keep going while the caller works with the returned list.
    pub fn list_all(&self) -> Vec<Arc<Node>> {
        let mut snapshot: Vec<Arc<Node>> = self
            .nodes
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        snapshot.sort_by(|a, b| a.id().cmp(b.id()));
        snapshot
    }

    /// Ids of every node, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.nodes.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Node>> {
        self.nodes.remove(id).map(|(_, node)| node)
    }

    /// Mutate a stored node in place.
    ///
    /// The node is copied, changed and swapped back while the entry lock is
    /// held, so concurrent updates to one id never lose each other's changes
    /// and readers holding the old snapshot are unaffected. Returns `false`
    /// if no node has this id.
    pub fn update<F>(&self, id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut Node),
    {
        match self.nodes.get_mut(id) {
            Some(mut entry) => {
                let mut node = Node::clone(entry.value());
                mutate(&mut node);
                debug_assert_eq!(node.id(), id);
                *entry.value_mut() = Arc::new(node);
                true
            }
            None => false,
        }
    }

    /// Refresh a node's last-observed time
    pub fn touch(&self, id: &str, time: DateTime<Local>) -> bool {
        self.update(id, |node| node.set_updated_time(time))
    }

    /// Remove every node last observed before `cutoff`. Returns the removed ids, sorted.
    pub fn evict_stale(&self, cutoff: DateTime<Local>) -> Vec<String> {
        let mut evicted = Vec::new();
        self.nodes.retain(|id, node| {
            let keep = node.updated_time() >= cutoff;
            if !keep {
                evicted.push(id.clone());
            }
            keep
        });
        evicted.sort();
        if !evicted.is_empty() {
            debug!("Evicted {} stale node(s): {:?}", evicted.len(), evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node
    pub fn clear(&self) {
        self.nodes.clear();
    }
}
