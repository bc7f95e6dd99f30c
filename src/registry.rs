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

//! Administrative operations on the bastion group table.

use anyhow::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{BastionGroup, ConfigStore, Strategy};
use crate::error::BastionError;
use crate::host::BastionHost;
use crate::rotation::COUNTERS_KEY;

/// Store key holding the `group name -> BastionGroup` table.
pub const GROUPS_KEY: &str = "bastion_groups";

/// Owns the mapping from group name to hosts, strategy, and health-check
/// flag. Groups change only through these explicit operations; every
/// mutation persists the full table atomically.
pub struct GroupRegistry {
    store: Arc<ConfigStore>,
}

impl GroupRegistry {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    async fn load(&self) -> BTreeMap<String, BastionGroup> {
        self.store.get(GROUPS_KEY).await.unwrap_or_default()
    }

    async fn save(&self, groups: &BTreeMap<String, BastionGroup>) -> Result<()> {
        self.store.set(GROUPS_KEY, groups).await
    }

    /// All groups, ordered by name.
    pub async fn list(&self) -> BTreeMap<String, BastionGroup> {
        self.load().await
    }

    pub async fn get(&self, name: &str) -> Result<BastionGroup> {
        self.load().await.remove(name).ok_or_else(|| {
            BastionError::GroupNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Create an empty group with default settings (round-robin rotation,
    /// health check enabled).
    pub async fn create(&self, name: &str) -> Result<()> {
        let mut groups = self.load().await;
        if groups.contains_key(name) {
            return Err(BastionError::DuplicateGroup {
                name: name.to_string(),
            }
            .into());
        }
        groups.insert(name.to_string(), BastionGroup::default());
        self.save(&groups).await?;
        tracing::debug!(group = name, "created bastion group");
        Ok(())
    }

    /// Parse a `[user@]host[:port]` specification and append it to the
    /// group. Returns the parsed host.
    pub async fn add_host(&self, name: &str, spec: &str) -> Result<BastionHost> {
        let host = BastionHost::parse(spec)?;
        let mut groups = self.load().await;
        let group = groups.get_mut(name).ok_or_else(|| BastionError::GroupNotFound {
            name: name.to_string(),
        })?;
        group.hosts.push(host.clone());
        self.save(&groups).await?;
        Ok(host)
    }

    /// Remove the host at `index`; later hosts shift down by one. Returns
    /// the removed host.
    pub async fn remove_host(&self, name: &str, index: usize) -> Result<BastionHost> {
        let mut groups = self.load().await;
        let group = groups.get_mut(name).ok_or_else(|| BastionError::GroupNotFound {
            name: name.to_string(),
        })?;
        if index >= group.hosts.len() {
            return Err(BastionError::IndexOutOfRange {
                group: name.to_string(),
                index,
                len: group.hosts.len(),
            }
            .into());
        }
        let removed = group.hosts.remove(index);
        self.save(&groups).await?;
        Ok(removed)
    }

    pub async fn set_strategy(&self, name: &str, strategy: Strategy) -> Result<()> {
        let mut groups = self.load().await;
        let group = groups.get_mut(name).ok_or_else(|| BastionError::GroupNotFound {
            name: name.to_string(),
        })?;
        group.strategy = strategy;
        self.save(&groups).await
    }

    /// Flip the group's health-check flag; returns the new state.
    pub async fn toggle_health_check(&self, name: &str) -> Result<bool> {
        let mut groups = self.load().await;
        let group = groups.get_mut(name).ok_or_else(|| BastionError::GroupNotFound {
            name: name.to_string(),
        })?;
        group.health_check = !group.health_check;
        let enabled = group.health_check;
        self.save(&groups).await?;
        Ok(enabled)
    }

    /// Delete a group together with its rotation cursor, in one atomic
    /// store write.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let groups = self.load().await;
        if !groups.contains_key(name) {
            return Err(BastionError::GroupNotFound {
                name: name.to_string(),
            }
            .into());
        }

        let name_owned = name.to_string();
        self.store
            .update(move |table| {
                if let Some(Value::Object(groups)) = table.get_mut(GROUPS_KEY) {
                    groups.remove(&name_owned);
                }
                if let Some(Value::Object(counters)) = table.get_mut(COUNTERS_KEY) {
                    counters.remove(&name_owned);
                }
            })
            .await?;

        tracing::debug!(group = name, "deleted bastion group and rotation cursor");
        Ok(())
    }
}
