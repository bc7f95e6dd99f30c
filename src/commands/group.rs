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

use crate::config::Strategy;
use crate::registry::GroupRegistry;

pub async fn create_group(registry: &GroupRegistry, name: &str) -> Result<()> {
    registry.create(name).await?;
    println!("{} Created bastion group {}", "●".green(), name.bold());
    Ok(())
}

pub async fn delete_group(registry: &GroupRegistry, name: &str) -> Result<()> {
    registry.delete(name).await?;
    println!("{} Deleted bastion group {}", "●".green(), name.bold());
    Ok(())
}

pub async fn add_host(registry: &GroupRegistry, group: &str, spec: &str) -> Result<()> {
    let host = registry.add_host(group, spec).await?;
    println!(
        "{} Added {} to {}",
        "●".green(),
        host.to_string().bold(),
        group.bold()
    );
    Ok(())
}

pub async fn remove_host(registry: &GroupRegistry, group: &str, index: usize) -> Result<()> {
    let removed = registry.remove_host(group, index).await?;
    println!(
        "{} Removed {} from {}",
        "●".green(),
        removed.to_string().bold(),
        group.bold()
    );
    Ok(())
}

pub async fn set_strategy(registry: &GroupRegistry, group: &str, strategy: Strategy) -> Result<()> {
    registry.set_strategy(group, strategy).await?;
    println!(
        "{} Strategy for {} set to {}",
        "●".green(),
        group.bold(),
        strategy.to_string().yellow()
    );
    Ok(())
}

pub async fn toggle_health(registry: &GroupRegistry, group: &str) -> Result<()> {
    let enabled = registry.toggle_health_check(group).await?;
    let status = if enabled { "enabled" } else { "disabled" };
    println!(
        "{} Health check {} for {}",
        "●".green(),
        status.yellow(),
        group.bold()
    );
    Ok(())
}

pub async fn list_groups(registry: &GroupRegistry) -> Result<()> {
    let groups = registry.list().await;
    if groups.is_empty() {
        println!("{}", "No bastion groups configured".dimmed());
        return Ok(());
    }

    println!("\n{} {}\n", "▶".cyan(), "Bastion groups".bold());
    for (name, group) in &groups {
        println!(
            "  {} {} ({} {}, {}, health check {})",
            "●".blue(),
            name.bold(),
            group.hosts.len().to_string().yellow(),
            if group.hosts.len() == 1 { "host" } else { "hosts" },
            group.strategy,
            if group.health_check { "on" } else { "off" }
        );
        for host in &group.hosts {
            println!("    {} {}", "•".dimmed(), host.to_string().dimmed());
        }
    }
    println!();
    Ok(())
}

pub async fn show_group(registry: &GroupRegistry, name: &str) -> Result<()> {
    let group = registry.get(name).await?;

    println!("\n{} {}\n", "▶".cyan(), name.bold());
    println!("  Strategy:     {}", group.strategy.to_string().yellow());
    println!(
        "  Health check: {}",
        if group.health_check { "on" } else { "off" }
    );

    if group.hosts.is_empty() {
        println!("\n  {}", "No hosts configured".dimmed());
    } else {
        println!();
        for (index, host) in group.hosts.iter().enumerate() {
            println!(
                "  {} [{}] {}",
                "•".dimmed(),
                index.to_string().yellow(),
                host
            );
        }
    }
    println!();
    Ok(())
}
