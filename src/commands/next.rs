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
use crate::selector::Selector;

/// Run one selection against the group and print the pick. Advances the
/// rotation cursor for round-robin groups.
pub async fn select_next(store: Arc<ConfigStore>, group: &str, timeout: Duration) -> Result<()> {
    let selector = Selector::new(store).with_probe_timeout(timeout);
    let host = selector.select_next(group).await?;

    println!(
        "{} Selected bastion: {}",
        "▶".cyan(),
        host.to_string().green().bold()
    );
    Ok(())
}
