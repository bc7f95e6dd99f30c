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

use crate::binder::ProfileAssignments;
use crate::config::ConfigStore;
use crate::registry::GroupRegistry;

pub async fn assign_profile(store: Arc<ConfigStore>, profile: &str, group: &str) -> Result<()> {
    // Reject assignments to groups that do not exist
    GroupRegistry::new(store.clone()).get(group).await?;

    ProfileAssignments::new(store).assign(profile, group).await?;
    println!(
        "{} Profile {} now rotates through {}",
        "●".green(),
        profile.bold(),
        group.bold()
    );
    Ok(())
}

pub async fn unassign_profile(store: Arc<ConfigStore>, profile: &str) -> Result<()> {
    ProfileAssignments::new(store).unassign(profile).await?;
    println!(
        "{} Profile {} no longer uses bastion rotation",
        "●".green(),
        profile.bold()
    );
    Ok(())
}
