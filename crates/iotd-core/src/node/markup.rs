use std::io::Write;
use std::sync::Arc;

use log::{error, warn};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::node::error::NodeError;
use crate::node::model::{Node, format_updated_time};

pub const NODE_ELEMENT: &str = "Node";
pub const ITEMS_ELEMENT: &str = "Items";
pub const ITEM_ELEMENT: &str = "Item";
pub const NODES_ELEMENT: &str = "Nodes";

/// Identity attribute written on every `Node` element that is not covered by
/// the reserved-word check on custom attributes.
const UPDATED_TIME_ATTR: &str = "updatedTime";

/// Reject names that cannot be used as an XML attribute name.
pub(crate) fn check_markup_name(node_id: &str, name: &str) -> Result<(), NodeError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(NodeError::InvalidMarkupName {
            node_id: node_id.to_string(),
            name: name.to_string(),
        })
    }
}

fn emit<W: Write>(writer: &mut Writer<W>, node_id: &str, event: Event<'_>) -> Result<(), NodeError> {
    writer
        .write_event(event)
        .map_err(|e| NodeError::markup(node_id, e))?;
    Ok(())
}

impl Node {
    /// Checks everything that can make markup output fail, before any of it
    /// is written, so a failing node never leaves a half-written element.
    fn validate_markup(&self) -> Result<(), NodeError> {
        for key in self.attributes().keys() {
            if key != UPDATED_TIME_ATTR {
                check_markup_name(self.id(), key)?;
            }
        }
        if let Some(pin) = self.pin() {
            for key in pin.metadata().keys() {
                check_markup_name(self.id(), key)?;
            }
        }
        for item in self.items().values() {
            for (key, _) in item.pairs() {
                check_markup_name(self.id(), key)?;
            }
        }
        Ok(())
    }

    /// Write this node as a `Node` element.
    ///
    /// Layout: identity attributes, custom attributes, the optional `pin`
    /// element, then an `Items` element only when the node has items.
    pub fn write_markup<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), NodeError> {
        self.validate_markup()?;

        let updated = format_updated_time(&self.updated_time());
        let mut element = BytesStart::new(NODE_ELEMENT);
        element.push_attribute(("id", self.id()));
        element.push_attribute(("name", self.name()));
        element.push_attribute(("class", self.class_name()));
        element.push_attribute(("status", self.status().as_str()));
        element.push_attribute(("group", self.group_name()));
        element.push_attribute((UPDATED_TIME_ATTR, updated.as_str()));

        for (key, value) in self.attributes() {
            if key == UPDATED_TIME_ATTR {
                warn!("Node '{}': attribute '{}' shadows an identity field, skipped", self.id(), key);
                continue;
            }
            element.push_attribute((key.as_str(), value.as_str()));
        }

        if self.pin().is_none() && self.items().is_empty() {
            return emit(writer, self.id(), Event::Empty(element));
        }

        emit(writer, self.id(), Event::Start(element))?;

        if let Some(pin) = self.pin() {
            pin.write_markup(writer, self.id())?;
        }

        if !self.items().is_empty() {
            emit(writer, self.id(), Event::Start(BytesStart::new(ITEMS_ELEMENT)))?;
            for item in self.items().values() {
                let mut item_element = BytesStart::new(ITEM_ELEMENT);
                for (key, value) in item.pairs() {
                    item_element.push_attribute((key, value));
                }
                emit(writer, self.id(), Event::Empty(item_element))?;
            }
            emit(writer, self.id(), Event::End(BytesEnd::new(ITEMS_ELEMENT)))?;
        }

        emit(writer, self.id(), Event::End(BytesEnd::new(NODE_ELEMENT)))
    }

    /// Best-effort markup rendering.
    ///
    /// Returns an empty string when serialization fails; the failure is
    /// logged. An empty result means "markup unavailable", never an empty node.
    pub fn to_markup(&self) -> String {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        let rendered = self
            .write_markup(&mut writer)
            .and_then(|_| String::from_utf8(writer.into_inner()).map_err(|e| NodeError::markup(self.id(), e)));
        match rendered {
            Ok(markup) => markup,
            Err(e) => {
                error!("Cannot serialize node to markup: {}", e);
                String::new()
            }
        }
    }
}

/// Render a list of nodes inside a single `Nodes` element. Nodes that fail
/// to serialize are logged and left out.
pub fn nodes_to_markup(nodes: &[Arc<Node>]) -> String {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    if let Err(e) = write_nodes_markup(nodes, &mut writer) {
        error!("Cannot serialize node list to markup: {}", e);
        return String::new();
    }
    match String::from_utf8(writer.into_inner()) {
        Ok(markup) => markup,
        Err(e) => {
            error!("Node list markup is not valid UTF-8: {}", e);
            String::new()
        }
    }
}

fn write_nodes_markup<W: Write>(nodes: &[Arc<Node>], writer: &mut Writer<W>) -> Result<(), NodeError> {
    if nodes.is_empty() {
        return emit(writer, NODES_ELEMENT, Event::Empty(BytesStart::new(NODES_ELEMENT)));
    }
    emit(writer, NODES_ELEMENT, Event::Start(BytesStart::new(NODES_ELEMENT)))?;
    for node in nodes {
        if let Err(e) = node.write_markup(writer) {
            error!("Skipping node '{}' in list markup: {}", node.id(), e);
        }
    }
    emit(writer, NODES_ELEMENT, Event::End(BytesEnd::new(NODES_ELEMENT)))
}
