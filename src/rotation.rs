// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persisted per-group rotation cursors.

use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConfigStore;

/// Store key holding the `group name -> cursor` table.
pub const COUNTERS_KEY: &str = "bastion_counters";

/// Persisted rotation cursors, one per group.
///
/// Entries appear lazily on the first round-robin selection for a group and
/// are removed only when the owning group is deleted.
pub struct RotationStateStore {
    store: Arc<ConfigStore>,
}

impl RotationStateStore {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    /// Current cursor for a group; 0 when no entry exists yet.
    pub async fn get(&self, group: &str) -> u64 {
        self.store
            .get::<HashMap<String, u64>>(COUNTERS_KEY)
            .await
            .and_then(|counters| counters.get(group).copied())
            .unwrap_or(0)
    }

    /// Persist the cursor for a group.
    pub async fn set(&self, group: &str, value: u64) -> Result<()> {
        let group = group.to_string();
        self.store
            .update(move |table| {
                let counters = table
                    .entry(COUNTERS_KEY)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(map) = counters {
                    map.insert(group, Value::from(value));
                }
            })
            .await
    }

    /// Drop a group's cursor entry (cascade from group deletion).
    pub async fn remove(&self, group: &str) -> Result<()> {
        let group = group.to_string();
        self.store
            .update(move |table| {
                if let Some(Value::Object(counters)) = table.get_mut(COUNTERS_KEY) {
                    counters.remove(&group);
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_cursor_defaults_to_zero() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            ConfigStore::open(&dir.path().join("store.json"))
                .await
                .unwrap(),
        );
        let cursors = RotationStateStore::new(store);

        assert_eq!(cursors.get("prod").await, 0);
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempdir().unwrap();
        let store = Arc::new(
            ConfigStore::open(&dir.path().join("store.json"))
                .await
                .unwrap(),
        );
        let cursors = RotationStateStore::new(store);

        cursors.set("prod", 2).await.unwrap();
        cursors.set("staging", 7).await.unwrap();
        assert_eq!(cursors.get("prod").await, 2);
        assert_eq!(cursors.get("staging").await, 7);

        cursors.remove("prod").await.unwrap();
        assert_eq!(cursors.get("prod").await, 0);
        assert_eq!(cursors.get("staging").await, 7);
    }
}
