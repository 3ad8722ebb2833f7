#![cfg(test)]

use chrono::{Local, TimeZone};
use serde_json::json;

use crate::node::{Node, NodeIdentity, NodeItem, format_updated_time};
use crate::registry::NodeRegistry;

fn sample() -> Node {
    Node::builder("sensor-1")
        .class_name("Sensor")
        .updated_time(Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap())
        .attribute("a", "1")
        .item(NodeItem::new("x", "10", "ok"))
        .build()
        .unwrap()
}

#[test]
fn test_both_formats_carry_the_same_content() {
    let node = sample();

    let markup = node.to_markup();
    assert!(markup.contains("id=\"sensor-1\""));
    assert!(markup.contains("name=\"sensor-1\""));
    assert!(markup.contains("class=\"Sensor\""));
    assert!(markup.contains("group=\"Sensor\""));
    assert!(markup.contains("updatedTime=\"2024-03-09 14:05:07\""));
    assert!(markup.contains("a=\"1\""));
    assert!(markup.contains("<Item name=\"x\" value=\"10\" status=\"ok\"/>"));

    let object = node.to_object();
    assert_eq!(object["id"], json!("sensor-1"));
    assert_eq!(object["name"], json!("sensor-1"));
    assert_eq!(object["group"], json!("Sensor"));
    assert_eq!(object["updatedTime"], json!("2024-03-09 14:05:07"));
    assert_eq!(object["a"], json!("1"));
    assert_eq!(object["items"], json!([{ "name": "x", "value": "10", "status": "ok" }]));

    let from_markup = NodeIdentity::from_markup(&markup).unwrap();
    let from_object = NodeIdentity::from_object(&object).unwrap();
    assert_eq!(from_markup, from_object);
    assert_eq!(from_markup, NodeIdentity::of(&node));
}

#[test]
fn test_registry_update_is_visible_in_both_formats() {
    let registry = NodeRegistry::new();
    registry.upsert(sample());
    let later = Local.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap();

    assert!(registry.update("sensor-1", |node| {
        node.set_item("x", "11", "warn");
        node.set_attribute("b", "2");
        node.set_updated_time(later);
    }));

    let node = registry.get("sensor-1").unwrap();
    let object = node.to_object();
    assert_eq!(object["items"][0]["value"], json!("11"));
    assert_eq!(object["b"], json!("2"));
    assert_eq!(object["updatedTime"], json!(format_updated_time(&later)));
    assert!(node.to_markup().contains("<Item name=\"x\" value=\"11\" status=\"warn\"/>"));
}
