use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use bastor::binder::{
    AuthMethod, ConnectionBinder, ConnectionMutator, ConnectionPatch, ProfileAssignments,
    SessionInfo,
};
use bastor::config::ConfigStore;
use bastor::probe::NetworkProbe;
use bastor::registry::GroupRegistry;
use bastor::selector::Selector;

/// Mutator stub recording every applied patch.
#[derive(Default)]
struct RecordingMutator {
    patches: tokio::sync::Mutex<Vec<(String, ConnectionPatch)>>,
}

#[async_trait]
impl ConnectionMutator for RecordingMutator {
    async fn apply(&self, session_id: &str, patch: ConnectionPatch) -> Result<()> {
        self.patches
            .lock()
            .await
            .push((session_id.to_string(), patch));
        Ok(())
    }
}

struct AllUp;

#[async_trait]
impl NetworkProbe for AllUp {
    async fn test(&self, _host: &str, _port: u16, _timeout: Duration) -> bool {
        true
    }
}

async fn open_store(dir: &TempDir) -> Arc<ConfigStore> {
    Arc::new(
        ConfigStore::open(&dir.path().join("store.json"))
            .await
            .unwrap(),
    )
}

fn binder_with_stub_probe(
    store: Arc<ConfigStore>,
    mutator: Arc<RecordingMutator>,
) -> ConnectionBinder {
    let selector = Selector::new(store.clone()).with_probe(Arc::new(AllUp));
    ConnectionBinder::new(store, mutator).with_selector(selector)
}

fn session(profile_id: Option<&str>) -> SessionInfo {
    SessionInfo {
        id: "session-1".to_string(),
        profile_id: profile_id.map(str::to_string),
        username: "alice".to_string(),
    }
}

#[tokio::test]
async fn test_injects_single_jump_hop_with_host_user() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let registry = GroupRegistry::new(store.clone());
    registry.create("prod").await.unwrap();
    registry.add_host("prod", "admin@b1:2222").await.unwrap();

    ProfileAssignments::new(store.clone())
        .assign("p1", "prod")
        .await
        .unwrap();

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("p1"))).await;

    let patches = mutator.patches.lock().await;
    assert_eq!(patches.len(), 1);
    let (session_id, patch) = &patches[0];
    assert_eq!(session_id, "session-1");
    assert_eq!(patch.jump_hosts.len(), 1);

    let hop = &patch.jump_hosts[0];
    assert_eq!(hop.host, "b1");
    assert_eq!(hop.port, 2222);
    assert_eq!(hop.username, "admin");
    assert_eq!(hop.auth_method, AuthMethod::Agent);
}

#[tokio::test]
async fn test_falls_back_to_session_username() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let registry = GroupRegistry::new(store.clone());
    registry.create("prod").await.unwrap();
    registry.add_host("prod", "b1").await.unwrap();

    ProfileAssignments::new(store.clone())
        .assign("p1", "prod")
        .await
        .unwrap();

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("p1"))).await;

    let patches = mutator.patches.lock().await;
    assert_eq!(patches[0].1.jump_hosts[0].username, "alice");
}

#[tokio::test]
async fn test_skips_session_without_profile() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(None)).await;

    assert!(mutator.patches.lock().await.is_empty());
}

#[tokio::test]
async fn test_skips_profile_without_assignment() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("unbound"))).await;

    assert!(mutator.patches.lock().await.is_empty());
}

#[tokio::test]
async fn test_assignment_to_deleted_group_is_nonfatal() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    // Assignment left behind after its group was deleted
    ProfileAssignments::new(store.clone())
        .assign("p1", "ghost")
        .await
        .unwrap();

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("p1"))).await;

    assert!(mutator.patches.lock().await.is_empty());
}

#[tokio::test]
async fn test_engine_errors_do_not_escape_the_hook() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    // Empty group: selection fails, but the hook must swallow it
    let registry = GroupRegistry::new(store.clone());
    registry.create("prod").await.unwrap();
    ProfileAssignments::new(store.clone())
        .assign("p1", "prod")
        .await
        .unwrap();

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("p1"))).await;

    assert!(mutator.patches.lock().await.is_empty());
}

#[tokio::test]
async fn test_unassign_stops_rotation() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let registry = GroupRegistry::new(store.clone());
    registry.create("prod").await.unwrap();
    registry.add_host("prod", "b1").await.unwrap();

    let assignments = ProfileAssignments::new(store.clone());
    assignments.assign("p1", "prod").await.unwrap();
    assignments.unassign("p1").await.unwrap();

    let mutator = Arc::new(RecordingMutator::default());
    let binder = binder_with_stub_probe(store, mutator.clone());

    binder.on_connect(&session(Some("p1"))).await;

    assert!(mutator.patches.lock().await.is_empty());
}
