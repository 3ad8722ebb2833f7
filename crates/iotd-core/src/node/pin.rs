use std::io::Write;

use indexmap::IndexMap;
use log::warn;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::node::error::NodeError;
use crate::node::markup::check_markup_name;

/// Element / key name of the pin in both output formats
pub const PIN_KEY: &str = "pin";

/// Position of a node (map pin, rack slot, floor plan coordinate...) plus
/// free-form metadata.
///
/// A [`Node`](crate::node::Node) owns its pin outright; builders clone a
/// borrowed pin so the node never shares it with the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PinObject {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    metadata: IndexMap<String, String>,
}

impl PinObject {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Coordinates keys are rejected so they cannot shadow the position.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if matches!(key.as_str(), "x" | "y" | "z") {
            warn!("Pin metadata key '{}' collides with a coordinate", key);
            return false;
        }
        self.metadata.insert(key, value.into());
        true
    }

    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    pub(crate) fn write_markup<W: Write>(
        &self,
        writer: &mut Writer<W>,
        node_id: &str,
    ) -> Result<(), NodeError> {
        let x = self.x.to_string();
        let y = self.y.to_string();
        let z = self.z.map(|z| z.to_string());

        let mut element = BytesStart::new(PIN_KEY);
        element.push_attribute(("x", x.as_str()));
        element.push_attribute(("y", y.as_str()));
        if let Some(z) = z.as_deref() {
            element.push_attribute(("z", z));
        }
        for (key, value) in &self.metadata {
            check_markup_name(node_id, key)?;
            element.push_attribute((key.as_str(), value.as_str()));
        }

        writer
            .write_event(Event::Empty(element))
            .map_err(|e| NodeError::markup(node_id, e))?;
        Ok(())
    }
}

impl Serialize for PinObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("x", &self.x)?;
        map.serialize_entry("y", &self.y)?;
        if let Some(z) = self.z {
            map.serialize_entry("z", &z)?;
        }
        for (key, value) in &self.metadata {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
