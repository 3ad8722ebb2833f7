#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::{GetterSetting, ServerSettings, SimpleSettings};
use crate::kernel::DataServer;
use crate::tests::integration::common::{STAMPING_TYPE, is_consistent, stamping_catalog, wait_for, write_file};

fn stamping_settings(count: usize) -> ServerSettings {
    ServerSettings {
        getters: (0..count)
            .map(|i| GetterSetting::new(format!("g{}", i), STAMPING_TYPE))
            .collect(),
        ..ServerSettings::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_getters_never_expose_mixed_nodes() {
    let server = Arc::new(DataServer::new(stamping_settings(4), stamping_catalog()));
    assert!(server.start().await);

    let done = Arc::new(AtomicBool::new(false));
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = {
        let registry = server.registry();
        let done = Arc::clone(&done);
        let reads = Arc::clone(&reads);
        tokio::spawn(async move {
            while !done.load(Ordering::Acquire) {
                for node in registry.list_all() {
                    assert!(is_consistent(&node), "mixed node: {:?}", node);
                    reads.fetch_add(1, Ordering::Relaxed);
                }
                tokio::task::yield_now().await;
            }
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    done.store(true, Ordering::Release);
    reader.await.unwrap();
    assert!(server.stop().await);

    assert!(reads.load(Ordering::Relaxed) > 0);
    let registry = server.registry();
    // One node per getter plus exactly one shared node
    assert_eq!(registry.len(), 5);
    assert!(is_consistent(&registry.get("shared").unwrap()));
}

#[tokio::test]
async fn test_queries_follow_live_ingestion() {
    let server = DataServer::new(stamping_settings(2), stamping_catalog());
    assert!(server.start().await);

    let frontend = server.frontend();
    assert!(wait_for(|| frontend.node_ids().map(|ids| ids.len() == 3).unwrap_or(false)).await);
    assert_eq!(frontend.node_ids().unwrap(), vec!["g0", "g1", "shared"]);

    let objects = frontend.nodes_object().unwrap();
    assert_eq!(objects.as_array().unwrap().len(), 3);
    let markup = frontend.nodes_markup().unwrap();
    assert_eq!(markup.matches("<Node ").count(), 3);

    assert!(server.stop().await);
    assert!(frontend.nodes_object().is_err());
}

#[tokio::test]
async fn test_hot_reload_changes_output_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    let reload = write_file(dir.path(), "reload.json", r#"{ "label": "reloaded" }"#);

    let settings = ServerSettings {
        getters: vec![
            GetterSetting::new("g0", STAMPING_TYPE)
                .with_settings(SimpleSettings::new().with("label", serde_json::json!("initial"))),
        ],
        ..ServerSettings::default()
    };
    let server = DataServer::new(settings, stamping_catalog());
    assert!(server.start().await);

    let registry = server.registry();
    let stamp_of = |registry: &crate::registry::NodeRegistry| {
        registry
            .get("g0")
            .and_then(|n| n.attribute("stamp").map(str::to_string))
            .unwrap_or_default()
    };
    assert!(wait_for(|| stamp_of(&registry).starts_with("g0-initial-")).await);

    server.update_getter_config("g0", &reload).await.unwrap();
    assert!(wait_for(|| stamp_of(&registry).starts_with("g0-reloaded-")).await);

    // A file without a label is rejected and the getter keeps running
    let broken = write_file(dir.path(), "broken.json", "{}");
    assert!(server.update_getter_config("g0", &broken).await.is_err());
    let manager = server.manager().await.unwrap();
    assert_eq!(
        manager.state("g0").await,
        Some(crate::plugin_system::GetterState::Running)
    );

    assert!(server.stop().await);
}

#[tokio::test]
async fn test_restart_after_stop_builds_fresh_getters() {
    let server = DataServer::new(stamping_settings(1), stamping_catalog());
    assert!(server.start().await);
    assert!(server.stop().await);

    let registry = server.registry();
    registry.clear();
    assert!(server.start().await);
    assert!(wait_for(|| registry.contains("g0")).await);
    assert!(server.stop().await);
}
