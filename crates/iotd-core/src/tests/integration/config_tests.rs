#![cfg(test)]

use crate::config::ServerSettings;
use crate::kernel::DataServer;
use crate::tests::integration::common::{stamping_catalog, wait_for, write_file};

#[tokio::test]
async fn test_server_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "server.json",
        r#"{
            "service_port": 9500,
            "getters": [
                { "id": "lab", "type": "stamping", "required": true, "settings": { "label": "lab" } },
                { "id": "ghost", "type": "not-registered" }
            ]
        }"#,
    );

    let settings = ServerSettings::load(&path).unwrap();
    let server = DataServer::new(settings, stamping_catalog());
    assert!(server.start().await, "unknown optional getter does not block start");
    assert_eq!(server.frontend().port(), 9500);

    let report = server.last_report().unwrap();
    assert_eq!(report.succeeded, vec!["lab"]);
    assert_eq!(report.failed_ids(), vec!["ghost"]);

    let registry = server.registry();
    assert!(wait_for(|| registry.contains("lab")).await);
    assert!(server.stop().await);
}

#[tokio::test]
async fn test_unknown_required_getter_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "server.json",
        r#"{ "getters": [ { "id": "ghost", "type": "not-registered", "required": true } ] }"#,
    );

    let server = DataServer::new(ServerSettings::load(&path).unwrap(), stamping_catalog());
    assert!(!server.start().await);
    assert!(!server.is_running());
    let report = server.last_report().unwrap();
    assert!(!report.is_success());
}
