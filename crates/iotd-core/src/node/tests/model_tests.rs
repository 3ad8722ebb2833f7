// crates/iotd-core/src/node/tests/model_tests.rs
#![cfg(test)]

use chrono::{Local, TimeZone};

use crate::node::{
    DEFAULT_CLASS_NAME, Node, NodeError, NodeItem, NodeStatus, PinObject, RESERVED_WORDS, is_reserved_word,
    parse_updated_time, format_updated_time, truncate_to_seconds,
};

#[test]
fn test_name_defaults_to_id() {
    let node = Node::new("sensor-1").unwrap();
    assert_eq!(node.id(), "sensor-1");
    assert_eq!(node.name(), "sensor-1");
}

#[test]
fn test_blank_name_defaults_to_id() {
    let node = Node::builder("sensor-1").name("   ").build().unwrap();
    assert_eq!(node.name(), "sensor-1");
}

#[test]
fn test_group_defaults_to_class() {
    let node = Node::builder("pump-7").class_name("PumpGetter").build().unwrap();
    assert_eq!(node.class_name(), "PumpGetter");
    assert_eq!(node.group_name(), "PumpGetter");

    let plain = Node::new("plain").unwrap();
    assert_eq!(plain.class_name(), DEFAULT_CLASS_NAME);
    assert_eq!(plain.group_name(), DEFAULT_CLASS_NAME);
}

#[test]
fn test_explicit_fields_are_kept() {
    let time = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 45).unwrap();
    let node = Node::builder("n1")
        .name("Boiler")
        .class_name("Thermo")
        .group_name("Basement")
        .status(NodeStatus::Warning)
        .updated_time(time)
        .build()
        .unwrap();

    assert_eq!(node.name(), "Boiler");
    assert_eq!(node.class_name(), "Thermo");
    assert_eq!(node.group_name(), "Basement");
    assert_eq!(node.status(), NodeStatus::Warning);
    assert_eq!(node.updated_time(), time);
}

#[test]
fn test_empty_id_is_rejected() {
    assert!(matches!(Node::new(""), Err(NodeError::EmptyId)));
    assert!(matches!(Node::builder("  ").build(), Err(NodeError::EmptyId)));
}

#[test]
fn test_status_defaults_to_none() {
    let node = Node::new("n").unwrap();
    assert_eq!(node.status(), NodeStatus::None);
}

#[test]
fn test_reserved_words_any_case() {
    for word in RESERVED_WORDS {
        assert!(is_reserved_word(word));
        assert!(is_reserved_word(&word.to_uppercase()));
    }
    assert!(is_reserved_word("Class"));
    assert!(!is_reserved_word("updatedTime"));
    assert!(!is_reserved_word("identifier"));
}

#[test]
fn test_set_attribute_rejects_reserved_words() {
    let mut node = Node::new("n1").unwrap();
    for key in ["id", "NAME", "Class", "status", "gRoUp", "updated"] {
        assert!(!node.set_attribute(key, "hijack"), "'{}' should be rejected", key);
    }
    assert!(node.attributes().is_empty());
    assert_eq!(node.id(), "n1");
    assert_eq!(node.name(), "n1");
}

#[test]
fn test_builder_filters_reserved_words_like_setter() {
    let node = Node::builder("n1")
        .attribute("Status", "Error")
        .attribute("location", "roof")
        .attributes([("GROUP", "x"), ("unit", "C")])
        .build()
        .unwrap();

    assert_eq!(node.status(), NodeStatus::None);
    assert_eq!(node.group_name(), DEFAULT_CLASS_NAME);
    let keys: Vec<&str> = node.attributes().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["location", "unit"]);
}

#[test]
fn test_set_attribute_upserts() {
    let mut node = Node::new("n1").unwrap();
    assert!(node.set_attribute("unit", "C"));
    assert!(node.set_attribute("unit", "F"));
    assert_eq!(node.attribute("unit"), Some("F"));
    assert_eq!(node.attributes().len(), 1);
    assert_eq!(node.remove_attribute("unit"), Some("F".to_string()));
    assert!(node.attribute("unit").is_none());
}

#[test]
fn test_items_keyed_by_name_and_overwritten() {
    let mut node = Node::new("n1").unwrap();
    node.set_item("temp", "21.5", "ok");
    node.set_item("humidity", "40", "ok");
    node.set_item("temp", "22.0", "warning");

    assert_eq!(node.items().len(), 2);
    let temp = node.item("temp").unwrap();
    assert_eq!(temp.value(), "22.0");
    assert_eq!(temp.status(), "warning");

    // Overwrite keeps the original position
    let names: Vec<&str> = node.items().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["temp", "humidity"]);

    for (key, item) in node.items() {
        assert_eq!(key, item.name());
    }
}

#[test]
fn test_builder_items_go_through_setter() {
    let node = Node::builder("n1")
        .item(NodeItem::new("a", "1", ""))
        .items([NodeItem::new("b", "2", ""), NodeItem::new("a", "3", "")])
        .build()
        .unwrap();
    assert_eq!(node.items().len(), 2);
    assert_eq!(node.item("a").unwrap().value(), "3");
}

#[test]
fn test_pin_is_owned_copy() {
    let mut pin = PinObject::new(1.0, 2.0).with_metadata("floor", "2");
    let node = Node::builder("n1").pin_from(&pin).build().unwrap();

    pin.x = 99.0;
    pin.set_metadata("floor", "9");

    let owned = node.pin().unwrap();
    assert_eq!(owned.x, 1.0);
    assert_eq!(owned.metadata().get("floor").map(String::as_str), Some("2"));
}

#[test]
fn test_updated_time_is_mutable() {
    let mut node = Node::new("n1").unwrap();
    let later = Local.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    node.set_updated_time(later);
    assert_eq!(node.updated_time(), later);

    node.touch();
    assert!(node.updated_time() < later);
}

#[test]
fn test_time_format_round_trip_at_second_resolution() {
    let time = Local.with_ymd_and_hms(2024, 7, 9, 8, 7, 6).unwrap() + chrono::Duration::milliseconds(789);
    let text = format_updated_time(&time);
    assert_eq!(text, "2024-07-09 08:07:06");
    assert_eq!(parse_updated_time(&text), Some(truncate_to_seconds(time)));
    assert!(parse_updated_time("yesterday").is_none());
}

#[test]
fn test_status_parse_and_display() {
    for status in NodeStatus::ALL {
        assert_eq!(status.to_string().parse::<NodeStatus>().unwrap(), status);
    }
    assert_eq!("offline".parse::<NodeStatus>().unwrap(), NodeStatus::Offline);
    assert!(matches!("broken".parse::<NodeStatus>(), Err(NodeError::UnknownStatus(_))));
}
