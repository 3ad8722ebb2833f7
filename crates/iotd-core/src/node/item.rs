use indexmap::IndexMap;
use log::warn;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single reading inside a [`Node`](crate::node::Node), e.g. one channel of a sensor.
///
/// Behaves like a small ordered dictionary whose first three entries are
/// always `name`, `value` and `status`. The name is the key under which the
/// item is stored in its node and cannot change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeItem {
    name: String,
    value: String,
    status: String,
    extras: IndexMap<String, String>,
}

impl NodeItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            status: status.into(),
            extras: IndexMap::new(),
        }
    }

    /// Builder-style variant of [`NodeItem::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Set any pair on the item. `value` and `status` route to their fields.
    /// Returns `false` (and logs) when the key is `name`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        match key.as_str() {
            "name" => {
                warn!("Item '{}': the item name cannot be changed through set()", self.name);
                false
            }
            "value" => {
                self.value = value.into();
                true
            }
            "status" => {
                self.status = value.into();
                true
            }
            _ => {
                self.extras.insert(key, value.into());
                true
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "value" => Some(&self.value),
            "status" => Some(&self.status),
            _ => self.extras.get(key).map(String::as_str),
        }
    }

    /// Pairs in output order: `name`, `value`, `status`, then extras as inserted.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            ("name", self.name.as_str()),
            ("value", self.value.as_str()),
            ("status", self.status.as_str()),
        ]
        .into_iter()
        .chain(self.extras.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn pair_count(&self) -> usize {
        3 + self.extras.len()
    }
}

impl Serialize for NodeItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.pair_count()))?;
        for (key, value) in self.pairs() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
