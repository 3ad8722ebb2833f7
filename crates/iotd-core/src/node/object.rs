use std::sync::Arc;

use log::{error, warn};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::node::item::NodeItem;
use crate::node::model::{Node, format_updated_time};
use crate::node::pin::PIN_KEY;

pub const ITEMS_KEY: &str = "items";

/// Top-level keys of the object form that custom attributes cannot overwrite.
/// The identity keys proper are already excluded by the reserved-word check.
const STRUCTURAL_KEYS: [&str; 3] = ["updatedTime", PIN_KEY, ITEMS_KEY];

struct ItemList<'a>(&'a indexmap::IndexMap<String, NodeItem>);

impl Serialize for ItemList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for item in self.0.values() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

/// Serializes to the flat structured-object projection of a node.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", self.id())?;
        map.serialize_entry("name", self.name())?;
        map.serialize_entry("class", self.class_name())?;
        map.serialize_entry("status", &self.status())?;
        map.serialize_entry("group", self.group_name())?;
        map.serialize_entry("updatedTime", &format_updated_time(&self.updated_time()))?;

        for (key, value) in self.attributes() {
            if STRUCTURAL_KEYS.contains(&key.as_str()) {
                warn!("Node '{}': attribute '{}' shadows a structural key, skipped", self.id(), key);
                continue;
            }
            map.serialize_entry(key, value)?;
        }

        if let Some(pin) = self.pin() {
            map.serialize_entry(PIN_KEY, pin)?;
        }

        if !self.items().is_empty() {
            map.serialize_entry(ITEMS_KEY, &ItemList(self.items()))?;
        }

        map.end()
    }
}

impl Node {
    /// Best-effort structured-object rendering.
    ///
    /// Falls back to an empty object (and logs) if serialization fails.
    pub fn to_object(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(value) => value,
            Err(e) => {
                error!("Cannot serialize node '{}' to an object: {}", self.id(), e);
                Value::Object(Map::new())
            }
        }
    }
}

/// Render a list of nodes as an array of node objects
pub fn nodes_to_object(nodes: &[Arc<Node>]) -> Value {
    Value::Array(nodes.iter().map(|node| node.to_object()).collect())
}
