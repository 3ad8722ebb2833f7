// crates/iotd-core/src/node/tests/markup_tests.rs
#![cfg(test)]

use std::sync::Arc;

use chrono::{Local, TimeZone};

use crate::node::{Node, NodeItem, NodeStatus, PinObject, nodes_to_markup};

fn sample_node() -> Node {
    let time = Local.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap() + chrono::Duration::milliseconds(450);
    Node::builder("n1")
        .class_name("Thermo")
        .status(NodeStatus::Ok)
        .updated_time(time)
        .attribute("a", "1")
        .item(NodeItem::new("x", "10", "ok"))
        .build()
        .unwrap()
}

#[test]
fn test_markup_contains_identity_attributes_and_items() {
    let markup = sample_node().to_markup();

    assert!(markup.starts_with("<Node "), "unexpected markup: {}", markup);
    assert!(markup.contains(r#"id="n1""#));
    assert!(markup.contains(r#"name="n1""#));
    assert!(markup.contains(r#"class="Thermo""#));
    assert!(markup.contains(r#"status="Ok""#));
    assert!(markup.contains(r#"group="Thermo""#));
    assert!(markup.contains(r#"updatedTime="2024-05-06 07:08:09""#));
    assert!(markup.contains(r#"a="1""#));
    assert!(markup.contains("<Items>"));
    assert_eq!(markup.matches("<Item ").count(), 1);
    assert!(markup.contains(r#"<Item name="x" value="10" status="ok"/>"#));
    assert!(markup.trim_end().ends_with("</Node>"));
}

#[test]
fn test_markup_attribute_order() {
    let markup = sample_node().to_markup();
    let positions: Vec<usize> = ["id=", "name=", "class=", "status=", "group=", "updatedTime=", "a="]
        .iter()
        .map(|key| markup.find(&format!(" {}", key)).expect(key))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn test_markup_without_items_has_no_items_element() {
    let node = Node::builder("bare").attribute("a", "1").build().unwrap();
    let markup = node.to_markup();
    assert!(!markup.contains("Items"));
    assert!(markup.trim_end().ends_with("/>"));
}

#[test]
fn test_markup_writes_pin_before_items() {
    let node = Node::builder("n1")
        .pin(PinObject::new(1.5, 2.0).with_metadata("floor", "3"))
        .item(NodeItem::new("x", "10", "ok"))
        .build()
        .unwrap();
    let markup = node.to_markup();

    let pin_at = markup.find("<pin ").expect("pin element");
    let items_at = markup.find("<Items>").expect("items element");
    assert!(pin_at < items_at);
    assert!(markup.contains(r#"<pin x="1.5" y="2" floor="3"/>"#));
}

#[test]
fn test_markup_is_idempotent() {
    let node = sample_node();
    assert_eq!(node.to_markup(), node.to_markup());
}

#[test]
fn test_markup_escapes_values() {
    let node = Node::builder("n1").attribute("note", "a<b & \"c\"").build().unwrap();
    let markup = node.to_markup();
    assert!(markup.contains("a&lt;b &amp; &quot;c&quot;"));
}

#[test]
fn test_reserved_attribute_never_reaches_markup() {
    let mut node = sample_node();
    node.set_attribute("STATUS", "Error");
    node.set_attribute("group", "elsewhere");
    let markup = node.to_markup();
    assert!(markup.contains(r#"status="Ok""#));
    assert!(!markup.contains("STATUS="));
    assert!(!markup.contains("elsewhere"));
}

#[test]
fn test_invalid_attribute_name_yields_empty_markup() {
    let mut node = sample_node();
    node.set_attribute("not valid", "x");
    assert_eq!(node.to_markup(), "");

    let mut writer = quick_xml::Writer::new(Vec::new());
    assert!(node.write_markup(&mut writer).is_err());
    // Validation runs before anything is written
    assert!(writer.into_inner().is_empty());
}

#[test]
fn test_updated_time_attribute_is_skipped() {
    let mut node = sample_node();
    assert!(node.set_attribute("updatedTime", "never"));
    let markup = node.to_markup();
    assert_eq!(markup.matches("updatedTime=").count(), 1);
    assert!(!markup.contains("never"));
}

#[test]
fn test_nodes_markup_skips_broken_nodes() {
    let good = Arc::new(sample_node());
    let mut broken = Node::new("broken").unwrap();
    broken.set_attribute("1bad", "x");

    let markup = nodes_to_markup(&[good, Arc::new(broken)]);
    assert!(markup.starts_with("<Nodes>"));
    assert!(markup.contains(r#"id="n1""#));
    assert!(!markup.contains(r#"id="broken""#));
    assert!(markup.trim_end().ends_with("</Nodes>"));

    assert_eq!(nodes_to_markup(&[]), "<Nodes/>");
}
