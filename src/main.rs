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
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use bastor::{
    cli::{Cli, Commands, GroupAction},
    commands::{assign, group, next, ping},
    config::ConfigStore,
    registry::GroupRegistry,
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let store_path = match &cli.config {
        Some(path) => path.clone(),
        None => ConfigStore::default_path()?,
    };
    let store = Arc::new(ConfigStore::open(&store_path).await?);
    let probe_timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Group { action } => {
            let registry = GroupRegistry::new(store);
            match action {
                GroupAction::Create { name } => group::create_group(&registry, &name).await?,
                GroupAction::Delete { name } => group::delete_group(&registry, &name).await?,
                GroupAction::List => group::list_groups(&registry).await?,
                GroupAction::Show { name } => group::show_group(&registry, &name).await?,
                GroupAction::AddHost { group: name, host } => {
                    group::add_host(&registry, &name, &host).await?
                }
                GroupAction::RemoveHost { group: name, index } => {
                    group::remove_host(&registry, &name, index).await?
                }
                GroupAction::SetStrategy {
                    group: name,
                    strategy,
                } => group::set_strategy(&registry, &name, strategy).await?,
                GroupAction::ToggleHealth { group: name } => {
                    group::toggle_health(&registry, &name).await?
                }
            }
        }
        Commands::Assign { profile, group } => {
            assign::assign_profile(store, &profile, &group).await?
        }
        Commands::Unassign { profile } => assign::unassign_profile(store, &profile).await?,
        Commands::Next { group } => next::select_next(store, &group, probe_timeout).await?,
        Commands::Ping { group } => ping::ping_group(store, &group, probe_timeout).await?,
    }

    Ok(())
}
