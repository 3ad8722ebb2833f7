use chrono::{DateTime, Local};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde_json::Value;

use crate::node::error::NodeError;
use crate::node::markup::NODE_ELEMENT;
use crate::node::model::{Node, parse_updated_time, truncate_to_seconds};
use crate::node::status::NodeStatus;

/// The identity fields of a node as they survive either serialization.
///
/// Lets a client (or a test) read back what a node looked like from its
/// markup or object form. `updated_time` is always at second resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub status: NodeStatus,
    pub group_name: String,
    pub updated_time: DateTime<Local>,
}

#[derive(Default)]
struct PartialIdentity {
    id: Option<String>,
    name: Option<String>,
    class_name: Option<String>,
    status: Option<String>,
    group_name: Option<String>,
    updated_time: Option<String>,
}

impl PartialIdentity {
    fn assign(&mut self, key: &str, value: String) {
        match key {
            "id" => self.id = Some(value),
            "name" => self.name = Some(value),
            "class" => self.class_name = Some(value),
            "status" => self.status = Some(value),
            "group" => self.group_name = Some(value),
            "updatedTime" => self.updated_time = Some(value),
            _ => {}
        }
    }

    fn finish(self) -> Result<NodeIdentity, NodeError> {
        fn required(field: Option<String>, key: &str) -> Result<String, NodeError> {
            field.ok_or_else(|| NodeError::Identity(format!("missing '{}'", key)))
        }

        let updated_text = required(self.updated_time, "updatedTime")?;
        let updated_time = parse_updated_time(&updated_text)
            .ok_or_else(|| NodeError::Identity(format!("bad updatedTime '{}'", updated_text)))?;

        Ok(NodeIdentity {
            id: required(self.id, "id")?,
            name: required(self.name, "name")?,
            class_name: required(self.class_name, "class")?,
            status: required(self.status, "status")?.parse()?,
            group_name: required(self.group_name, "group")?,
            updated_time,
        })
    }
}

impl NodeIdentity {
    /// Identity of a live node, truncated the way the serializers truncate it
    pub fn of(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            name: node.name().to_string(),
            class_name: node.class_name().to_string(),
            status: node.status(),
            group_name: node.group_name().to_string(),
            updated_time: truncate_to_seconds(node.updated_time()),
        }
    }

    /// Read the identity from the first `Node` element of a markup document
    pub fn from_markup(markup: &str) -> Result<Self, NodeError> {
        let mut reader = Reader::from_str(markup);
        loop {
            match reader.read_event() {
                Ok(Event::Start(element)) | Ok(Event::Empty(element))
                    if element.name().as_ref() == NODE_ELEMENT.as_bytes() =>
                {
                    let mut partial = PartialIdentity::default();
                    for attribute in element.attributes() {
                        let attribute = attribute.map_err(|e| NodeError::Identity(e.to_string()))?;
                        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
                        let value = attribute
                            .unescape_value()
                            .map_err(|e| NodeError::Identity(e.to_string()))?
                            .into_owned();
                        partial.assign(&key, value);
                    }
                    return partial.finish();
                }
                Ok(Event::Eof) => {
                    return Err(NodeError::Identity(format!("no '{}' element found", NODE_ELEMENT)));
                }
                Ok(_) => {}
                Err(e) => return Err(NodeError::Identity(e.to_string())),
            }
        }
    }

    /// Read the identity from a node object
    pub fn from_object(object: &Value) -> Result<Self, NodeError> {
        let map = object
            .as_object()
            .ok_or_else(|| NodeError::Identity("not an object".to_string()))?;
        let mut partial = PartialIdentity::default();
        for key in ["id", "name", "class", "status", "group", "updatedTime"] {
            if let Some(text) = map.get(key).and_then(Value::as_str) {
                partial.assign(key, text.to_string());
            }
        }
        partial.finish()
    }
}
