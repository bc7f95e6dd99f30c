use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use bastor::config::{ConfigStore, Strategy};
use bastor::error::BastionError;
use bastor::registry::GroupRegistry;
use bastor::selector::Selector;

async fn open_store(dir: &TempDir) -> Arc<ConfigStore> {
    Arc::new(
        ConfigStore::open(&dir.path().join("store.json"))
            .await
            .unwrap(),
    )
}

#[tokio::test]
async fn test_create_duplicate_group_fails() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);

    registry.create("prod").await.unwrap();
    let err = registry.create("prod").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BastionError>(),
        Some(BastionError::DuplicateGroup { .. })
    ));
}

#[tokio::test]
async fn test_add_host_parses_spec() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);
    registry.create("prod").await.unwrap();

    let host = registry
        .add_host("prod", "admin@bastion1.example.com:2222")
        .await
        .unwrap();
    assert_eq!(host.user, Some("admin".to_string()));
    assert_eq!(host.host, "bastion1.example.com");
    assert_eq!(host.port, 2222);

    let host = registry.add_host("prod", "bastion2").await.unwrap();
    assert_eq!(host.user, None);
    assert_eq!(host.host, "bastion2");
    assert_eq!(host.port, 22);
}

#[tokio::test]
async fn test_add_host_rejects_malformed_spec() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);
    registry.create("prod").await.unwrap();

    let err = registry.add_host("prod", "bad:port:str").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BastionError>(),
        Some(BastionError::InvalidHostFormat { .. })
    ));

    // Nothing was appended
    assert!(registry.get("prod").await.unwrap().hosts.is_empty());
}

#[tokio::test]
async fn test_add_host_to_missing_group_fails() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);

    let err = registry.add_host("ghost", "b1").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BastionError>(),
        Some(BastionError::GroupNotFound { .. })
    ));
}

#[tokio::test]
async fn test_remove_host_shifts_subsequent_indices() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);
    registry.create("prod").await.unwrap();
    registry.add_host("prod", "a").await.unwrap();
    registry.add_host("prod", "b").await.unwrap();
    registry.add_host("prod", "c").await.unwrap();

    let removed = registry.remove_host("prod", 0).await.unwrap();
    assert_eq!(removed.host, "a");

    let hosts = registry.get("prod").await.unwrap().hosts;
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].host, "b");
    assert_eq!(hosts[1].host, "c");
}

#[tokio::test]
async fn test_remove_host_out_of_range() {
    let dir = TempDir::new().unwrap();
    let registry = GroupRegistry::new(open_store(&dir).await);
    registry.create("prod").await.unwrap();
    registry.add_host("prod", "a").await.unwrap();

    let err = registry.remove_host("prod", 1).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BastionError>(),
        Some(BastionError::IndexOutOfRange { index: 1, len: 1, .. })
    ));
}

#[tokio::test]
async fn test_settings_persist_across_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let registry = GroupRegistry::new(open_store(&dir).await);
        registry.create("prod").await.unwrap();
        registry.add_host("prod", "admin@b1:2222").await.unwrap();
        registry
            .set_strategy("prod", Strategy::Failover)
            .await
            .unwrap();
        registry.toggle_health_check("prod").await.unwrap();
    }

    let registry = GroupRegistry::new(open_store(&dir).await);
    let group = registry.get("prod").await.unwrap();
    assert_eq!(group.strategy, Strategy::Failover);
    assert!(!group.health_check);
    assert_eq!(group.hosts.len(), 1);
    assert_eq!(group.hosts[0].port, 2222);
}

#[tokio::test]
async fn test_delete_group_cascades_rotation_cursor() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let registry = GroupRegistry::new(store.clone());

    registry.create("prod").await.unwrap();
    registry.toggle_health_check("prod").await.unwrap();
    registry.add_host("prod", "h1").await.unwrap();
    registry.add_host("prod", "h2").await.unwrap();

    // One selection creates the cursor entry lazily
    let selector = Selector::new(store.clone())
        .with_probe_timeout(Duration::from_millis(100));
    selector.select_next("prod").await.unwrap();

    let counters: HashMap<String, u64> = store.get("bastion_counters").await.unwrap();
    assert_eq!(counters.get("prod"), Some(&1));

    registry.delete("prod").await.unwrap();

    let counters: HashMap<String, u64> =
        store.get("bastion_counters").await.unwrap_or_default();
    assert!(!counters.contains_key("prod"));

    let err = registry.get("prod").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BastionError>(),
        Some(BastionError::GroupNotFound { .. })
    ));
}

#[tokio::test]
async fn test_persisted_wire_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let store = Arc::new(ConfigStore::open(&path).await.unwrap());
        let registry = GroupRegistry::new(store);
        registry.create("prod").await.unwrap();
        registry.add_host("prod", "admin@b1:2222").await.unwrap();
        registry.add_host("prod", "b2").await.unwrap();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let group = &value["bastion_groups"]["prod"];
    assert_eq!(group["strategy"], "round-robin");
    assert_eq!(group["health_check"], true);
    assert_eq!(group["hosts"][0]["host"], "b1");
    assert_eq!(group["hosts"][0]["port"], 2222);
    assert_eq!(group["hosts"][0]["user"], "admin");
    assert_eq!(group["hosts"][1]["host"], "b2");
    assert_eq!(group["hosts"][1]["port"], 22);
    assert_eq!(group["hosts"][1]["user"], serde_json::Value::Null);
}
