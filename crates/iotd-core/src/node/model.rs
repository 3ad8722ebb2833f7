use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use indexmap::IndexMap;
use log::error;

use crate::node::error::NodeError;
use crate::node::item::NodeItem;
use crate::node::pin::PinObject;
use crate::node::status::NodeStatus;

/// Attribute keys that collide with the identity fields of a node.
/// Checked case-insensitively.
pub const RESERVED_WORDS: [&str; 6] = ["id", "name", "class", "status", "group", "updated"];

/// Class name used when a node is built without one
pub const DEFAULT_CLASS_NAME: &str = "Node";

/// Format of `updatedTime` in both projections. Second resolution only:
/// sub-second precision is dropped on purpose.
pub const UPDATED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns true when `key` is one of [`RESERVED_WORDS`], ignoring case.
pub fn is_reserved_word(key: &str) -> bool {
    RESERVED_WORDS.iter().any(|word| word.eq_ignore_ascii_case(key))
}

pub fn format_updated_time(time: &DateTime<Local>) -> String {
    time.format(UPDATED_TIME_FORMAT).to_string()
}

/// Inverse of [`format_updated_time`]. Ambiguous local times (DST fold)
/// resolve to the earlier instant.
pub fn parse_updated_time(text: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), UPDATED_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Drop the sub-second part of a timestamp, matching what the serializers keep.
pub fn truncate_to_seconds(time: DateTime<Local>) -> DateTime<Local> {
    time.with_nanosecond(0).unwrap_or(time)
}

/// The atomic record tracked by the registry: a device, a sensor or any
/// logical entity a getter reports on.
///
/// Identity fields (`id`, `name`, `class`, `status`, `group`) are fixed at
/// construction. The update time, custom attributes and items can be changed
/// afterwards; see [`NodeRegistry::update`](crate::registry::NodeRegistry::update)
/// for doing that on a node that is already shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: String,
    name: String,
    class_name: String,
    status: NodeStatus,
    group_name: String,
    updated_time: DateTime<Local>,
    pin: Option<PinObject>,
    attributes: IndexMap<String, String>,
    items: IndexMap<String, NodeItem>,
}

impl Node {
    /// Start building a node with the given id
    pub fn builder(id: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(id)
    }

    /// Shorthand for a node with nothing but an id and all defaults applied
    pub fn new(id: impl Into<String>) -> Result<Self, NodeError> {
        NodeBuilder::new(id).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    pub fn updated_time(&self) -> DateTime<Local> {
        self.updated_time
    }

    pub fn set_updated_time(&mut self, time: DateTime<Local>) {
        self.updated_time = time;
    }

    /// Mark the node as observed now
    pub fn touch(&mut self) {
        self.updated_time = Local::now();
    }

    pub fn pin(&self) -> Option<&PinObject> {
        self.pin.as_ref()
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Upsert a custom attribute.
    ///
    /// Reserved words are logged and dropped; the call itself never fails.
    /// Returns whether the attribute was applied.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if is_reserved_word(&key) {
            error!("{}", NodeError::ReservedWord(key));
            return false;
        }
        self.attributes.insert(key, value.into());
        true
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    pub fn items(&self) -> &IndexMap<String, NodeItem> {
        &self.items
    }

    pub fn item(&self, name: &str) -> Option<&NodeItem> {
        self.items.get(name)
    }

    /// Upsert an item by name
    pub fn set_item(&mut self, name: impl Into<String>, value: impl Into<String>, status: impl Into<String>) {
        self.set_item_entry(NodeItem::new(name, value, status));
    }

    /// Upsert a prepared item, keyed by its own name. Replacing keeps the
    /// item's original position.
    pub fn set_item_entry(&mut self, item: NodeItem) {
        self.items.insert(item.name().to_string(), item);
    }

    pub fn remove_item(&mut self, name: &str) -> Option<NodeItem> {
        self.items.shift_remove(name)
    }
}

/// Builder for [`Node`]. Attributes and items go through the same setters
/// as a constructed node, so reserved words are filtered identically.
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    id: String,
    name: Option<String>,
    class_name: Option<String>,
    status: NodeStatus,
    group_name: Option<String>,
    updated_time: Option<DateTime<Local>>,
    pin: Option<PinObject>,
    attributes: Vec<(String, String)>,
    items: Vec<NodeItem>,
}

impl NodeBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            class_name: None,
            status: NodeStatus::None,
            group_name: None,
            updated_time: None,
            pin: None,
            attributes: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn status(mut self, status: NodeStatus) -> Self {
        self.status = status;
        self
    }

    pub fn group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = Some(group_name.into());
        self
    }

    pub fn updated_time(mut self, time: DateTime<Local>) -> Self {
        self.updated_time = Some(time);
        self
    }

    /// Take ownership of a pin
    pub fn pin(mut self, pin: PinObject) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Deep-copy a pin the caller keeps using
    pub fn pin_from(mut self, pin: &PinObject) -> Self {
        self.pin = Some(pin.clone());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attributes
            .extend(attributes.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn item(mut self, item: NodeItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn items(mut self, items: impl IntoIterator<Item = NodeItem>) -> Self {
        self.items.extend(items);
        self
    }

    pub fn build(self) -> Result<Node, NodeError> {
        if self.id.trim().is_empty() {
            return Err(NodeError::EmptyId);
        }

        let class_name = non_blank(self.class_name).unwrap_or_else(|| DEFAULT_CLASS_NAME.to_string());
        let name = non_blank(self.name).unwrap_or_else(|| self.id.clone());
        let group_name = non_blank(self.group_name).unwrap_or_else(|| class_name.clone());

        let mut node = Node {
            id: self.id,
            name,
            class_name,
            status: self.status,
            group_name,
            updated_time: self.updated_time.unwrap_or_else(Local::now),
            pin: self.pin,
            attributes: IndexMap::new(),
            items: IndexMap::new(),
        };

        for (key, value) in self.attributes {
            node.set_attribute(key, value);
        }
        for item in self.items {
            node.set_item_entry(item);
        }

        Ok(node)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
