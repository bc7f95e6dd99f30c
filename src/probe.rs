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

//! Bounded-time reachability probing for bastion hosts.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time;

use crate::host::BastionHost;

/// Default probe deadline when none is configured.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Reachability test for a single host:port.
///
/// Implementations must be infallible from the caller's point of view:
/// any connection error, resolution failure, or timeout is `false`.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn test(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

/// TCP-connect reachability probe.
pub struct TcpProbe;

#[async_trait]
impl NetworkProbe for TcpProbe {
    async fn test(&self, host: &str, port: u16, timeout: Duration) -> bool {
        match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => true,
            // Timeout, refused, or resolution failure all count as down
            _ => false,
        }
    }
}

/// Per-host probe outcome for one selection or ping round. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthResult {
    pub host_index: usize,
    pub reachable: bool,
}

/// Probe every host concurrently under a shared deadline.
///
/// All probes launch at once, so the wall-clock cost is bounded by
/// `timeout` rather than `timeout * hosts.len()`. A probe that outlives the
/// deadline is abandoned and its host reported unreachable; there are no
/// retries.
pub async fn check_hosts(
    probe: &dyn NetworkProbe,
    hosts: &[BastionHost],
    timeout: Duration,
) -> Vec<HealthResult> {
    let checks = hosts.iter().enumerate().map(|(host_index, host)| async move {
        let reachable = probe.test(&host.host, host.port, timeout).await;
        HealthResult {
            host_index,
            reachable,
        }
    });

    join_all(checks).await
}

/// Probe every host concurrently and return the reachable indices, in
/// original list order.
pub async fn check_all(
    probe: &dyn NetworkProbe,
    hosts: &[BastionHost],
    timeout: Duration,
) -> Vec<usize> {
    check_hosts(probe, hosts, timeout)
        .await
        .into_iter()
        .filter(|result| result.reachable)
        .map(|result| result.host_index)
        .collect()
}
