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

use anyhow::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigStore;
use crate::probe::{check_hosts, TcpProbe};
use crate::registry::GroupRegistry;

/// Probe every host in a group and report per-host reachability.
pub async fn ping_group(store: Arc<ConfigStore>, group_name: &str, timeout: Duration) -> Result<()> {
    let registry = GroupRegistry::new(store);
    let group = registry.get(group_name).await?;

    if group.hosts.is_empty() {
        println!("{}", "No hosts in this group".dimmed());
        return Ok(());
    }

    println!(
        "\n{} {} {}\n",
        "▶".cyan(),
        "Bastion reachability:".bold(),
        group_name.bold()
    );

    let results = check_hosts(&TcpProbe, &group.hosts, timeout).await;

    let mut reachable_count = 0;
    let mut unreachable_count = 0;

    for result in &results {
        let host = &group.hosts[result.host_index];
        if result.reachable {
            reachable_count += 1;
            println!(
                "  {} {} - {}",
                "●".green(),
                host.to_string().bold(),
                "Reachable".green()
            );
        } else {
            unreachable_count += 1;
            println!(
                "  {} {} - {}",
                "●".red(),
                host.to_string().bold(),
                "Unreachable".red()
            );
        }
    }

    println!(
        "\n{} hosts: {} reachable, {} unreachable\n",
        group.hosts.len(),
        reachable_count.to_string().green(),
        unreachable_count.to_string().red()
    );

    Ok(())
}
