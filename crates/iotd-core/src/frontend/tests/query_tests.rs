// crates/iotd-core/src/frontend/tests/query_tests.rs
#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use crate::frontend::{FrontendError, QueryService};
use crate::kernel::component::KernelComponent;
use crate::node::{Node, NodeItem};
use crate::registry::NodeRegistry;

fn seeded_registry() -> Arc<NodeRegistry> {
    let registry = Arc::new(NodeRegistry::new());
    registry.upsert(
        Node::builder("b-node")
            .attribute("a", "1")
            .item(NodeItem::new("x", "10", "ok"))
            .build()
            .unwrap(),
    );
    registry.upsert(Node::new("a-node").unwrap());
    registry
}

#[tokio::test]
async fn test_queries_refused_while_stopped() {
    let service = QueryService::new(seeded_registry(), 9090);
    assert!(!service.is_running());
    assert_eq!(service.node_ids(), Err(FrontendError::NotRunning { port: 9090 }));
    assert!(matches!(service.node_markup("a-node"), Err(FrontendError::NotRunning { .. })));
    assert!(matches!(service.nodes_object(), Err(FrontendError::NotRunning { .. })));

    service.start().await.unwrap();
    assert!(service.node_ids().is_ok());

    service.stop().await.unwrap();
    assert!(matches!(service.nodes_markup(), Err(FrontendError::NotRunning { .. })));
}

#[tokio::test]
async fn test_single_node_queries() {
    let service = QueryService::new(seeded_registry(), 8080);
    service.initialize().await.unwrap();
    service.start().await.unwrap();

    let markup = service.node_markup("b-node").unwrap();
    assert!(markup.starts_with("<Node id=\"b-node\""));
    assert!(markup.contains("<Item name=\"x\" value=\"10\" status=\"ok\"/>"));

    let object = service.node_object("b-node").unwrap();
    assert_eq!(object["a"], json!("1"));
    assert_eq!(object["items"][0]["value"], json!("10"));

    assert_eq!(
        service.node_object("ghost"),
        Err(FrontendError::NotFound("ghost".to_string()))
    );
}

#[tokio::test]
async fn test_all_node_queries_are_ordered_by_id() {
    let service = QueryService::new(seeded_registry(), 8080);
    service.start().await.unwrap();

    assert_eq!(service.node_ids().unwrap(), vec!["a-node", "b-node"]);

    let markup = service.nodes_markup().unwrap();
    assert!(markup.starts_with("<Nodes>"));
    let a = markup.find("id=\"a-node\"").unwrap();
    let b = markup.find("id=\"b-node\"").unwrap();
    assert!(a < b);

    let objects = service.nodes_object().unwrap();
    let ids: Vec<&str> = objects
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a-node", "b-node"]);
}

#[tokio::test]
async fn test_queries_see_registry_changes() {
    let registry = Arc::new(NodeRegistry::new());
    let service = QueryService::new(Arc::clone(&registry), 8080);
    service.start().await.unwrap();

    assert!(service.node_ids().unwrap().is_empty());
    assert_eq!(service.nodes_markup().unwrap(), "<Nodes/>");

    registry.upsert(Node::new("late").unwrap());
    assert_eq!(service.node_ids().unwrap(), vec!["late"]);
    assert_eq!(service.port(), 8080);
    assert_eq!(service.name(), "QueryService");
}
