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

//! Strategy dispatch: picks the bastion host for the next connection.

use anyhow::Result;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::{BastionGroup, ConfigStore, Strategy};
use crate::error::BastionError;
use crate::host::BastionHost;
use crate::probe::{check_all, NetworkProbe, TcpProbe, DEFAULT_PROBE_TIMEOUT};
use crate::registry::GroupRegistry;
use crate::rotation::RotationStateStore;

/// Health-gated strategy dispatcher over a group's host pool.
///
/// The round-robin cursor read-modify-write runs inside a per-group
/// critical section, so two overlapping selections on the same group can
/// never both observe the same cursor value. `Random` and `Failover` have
/// no shared mutable state and take no lock.
pub struct Selector {
    registry: GroupRegistry,
    cursors: RotationStateStore,
    probe: Arc<dyn NetworkProbe>,
    probe_timeout: Duration,
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Selector {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            registry: GroupRegistry::new(store.clone()),
            cursors: RotationStateStore::new(store),
            probe: Arc::new(TcpProbe),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Replace the reachability probe (tests inject a stub here).
    pub fn with_probe(mut self, probe: Arc<dyn NetworkProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Set the shared deadline for one probe round.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Select the bastion to use for the next connection through `group`.
    ///
    /// When the group's health check is enabled the pool is filtered to
    /// reachable hosts first; if every probe fails the full pool is used
    /// instead (fail-open) with a logged warning. `NoHostsAvailable` occurs
    /// only for a group with no configured hosts.
    ///
    /// The cursor is interpreted against the pool length at call time, so
    /// round-robin enumerates every member once per cycle only while the
    /// pool stays stable between calls.
    pub async fn select_next(&self, group_name: &str) -> Result<BastionHost> {
        let group = self.registry.get(group_name).await?;

        if group.hosts.is_empty() {
            return Err(BastionError::NoHostsAvailable {
                group: group_name.to_string(),
            }
            .into());
        }

        let pool = self.derive_pool(group_name, &group).await;

        let picked = match group.strategy {
            Strategy::Random => pool[rand::thread_rng().gen_range(0..pool.len())],
            Strategy::Failover => pool[0],
            Strategy::RoundRobin => self.round_robin_pick(group_name, &pool).await?,
            // No distinct selection rule observed; falls through to the
            // first pool host like Failover (see DESIGN.md).
            Strategy::HealthBased => pool[0],
        };

        Ok(group.hosts[picked].clone())
    }

    /// Host indices eligible for this selection: the full ordered list, or
    /// the reachable subset when health checking is on.
    async fn derive_pool(&self, group_name: &str, group: &BastionGroup) -> Vec<usize> {
        if !group.health_check {
            return (0..group.hosts.len()).collect();
        }

        let healthy = check_all(&*self.probe, &group.hosts, self.probe_timeout).await;
        if healthy.is_empty() {
            tracing::warn!(
                group = group_name,
                "all hosts failed health check, using full pool"
            );
            (0..group.hosts.len()).collect()
        } else {
            healthy
        }
    }

    async fn round_robin_pick(&self, group_name: &str, pool: &[usize]) -> Result<usize> {
        let lock = self.group_lock(group_name);
        let _guard = lock.lock().await;

        let cursor = self.cursors.get(group_name).await;
        let picked = pool[cursor as usize % pool.len()];
        let next = (cursor as usize + 1) % pool.len();
        self.cursors.set(group_name, next as u64).await?;

        Ok(picked)
    }

    fn group_lock(&self, group_name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("rotation lock map poisoned");
        locks.entry(group_name.to_string()).or_default().clone()
    }
}
