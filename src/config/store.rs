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

//! Persisted JSON key/value store backing groups, rotation counters, and
//! profile assignments.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use super::utils::expand_tilde;

/// JSON-valued key/value store persisted as a single file.
///
/// Keys in use: `bastion_groups` (group table), `bastion_counters`
/// (rotation cursors), `profile_bastion.<profileId>` (group assignment).
/// Every mutation rewrites the full table through a temp file + rename, so
/// readers never observe a partially written store.
pub struct ConfigStore {
    path: PathBuf,
    table: RwLock<Map<String, Value>>,
}

impl ConfigStore {
    /// Open the store at `path`, loading the existing table if the file
    /// exists and starting empty otherwise.
    pub async fn open(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let table = if expanded_path.exists() {
            let content = fs::read_to_string(&expanded_path).await.with_context(|| {
                format!(
                    "Failed to read store file at {}. Please check file permissions.",
                    expanded_path.display()
                )
            })?;
            serde_json::from_str(&content).with_context(|| {
                format!(
                    "Failed to parse store file at {}. The file must contain a single JSON object.",
                    expanded_path.display()
                )
            })?
        } else {
            tracing::debug!("Store file not found at {:?}, starting empty", expanded_path);
            Map::new()
        };

        Ok(Self {
            path: expanded_path,
            table: RwLock::new(table),
        })
    }

    /// Default store location.
    ///
    /// Priority order:
    /// 1. `$XDG_CONFIG_HOME/bastor/store.json`
    /// 2. Platform config directory via `ProjectDirs`
    /// 3. `~/.bastor/store.json`
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config_home)
                .join("bastor")
                .join("store.json"));
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", "bastor") {
            return Ok(proj_dirs.config_dir().join("store.json"));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .context("Unable to determine home directory")?;
        Ok(PathBuf::from(home).join(".bastor").join("store.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value by key, deserialized into `T`. Returns `None` for a
    /// missing key; a value that no longer matches the expected shape is
    /// logged and treated as missing.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let table = self.table.read().await;
        let value = table.get(key)?.clone();
        drop(table);

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(key, %err, "ignoring malformed store value");
                None
            }
        }
    }

    /// Set a key to a serialized value and persist the table.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).context("Failed to serialize store value")?;
        let key = key.to_string();
        self.update(move |table| {
            table.insert(key, value);
        })
        .await
    }

    /// Remove a key and persist the table.
    pub async fn remove(&self, key: &str) -> Result<()> {
        self.update(|table| {
            table.remove(key);
        })
        .await
    }

    /// Apply a mutation to the table and persist it as one atomic write.
    ///
    /// The write lock is held across the file write, so concurrent
    /// mutations serialize and each on-disk state is a complete table.
    pub async fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut table = self.table.write().await;
        mutate(&mut table);
        self.persist(&table).await
    }

    async fn persist(&self, table: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory {parent:?}"))?;
            }
        }

        let json =
            serde_json::to_string_pretty(table).context("Failed to serialize store table")?;

        // Write to a sibling temp file, then rename over the store so a
        // concurrent reader sees either the old or the new table in full.
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write store to {tmp_path:?}"))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to move store into place at {:?}", self.path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(&dir.path().join("store.json")).await.unwrap();

        store.set("answer", &42u64).await.unwrap();
        assert_eq!(store.get::<u64>("answer").await, Some(42));
        assert_eq!(store.get::<u64>("missing").await, None);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = ConfigStore::open(&path).await.unwrap();
            store.set("name", &"prod".to_string()).await.unwrap();
        }

        let store = ConfigStore::open(&path).await.unwrap();
        assert_eq!(store.get::<String>("name").await, Some("prod".to_string()));
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = ConfigStore::open(&path).await.unwrap();
        store.set("k", &1u32).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_value_is_treated_as_missing() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(&dir.path().join("store.json")).await.unwrap();

        store.set("counter", &"not a number".to_string()).await.unwrap();
        assert_eq!(store.get::<u64>("counter").await, None);
    }
}
