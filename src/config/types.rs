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

//! Persisted type definitions for bastion groups.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::BastionHost;

/// Rotation strategy for a bastion group.
///
/// Adding a strategy means adding a variant here and a match arm in
/// [`crate::selector::Selector`]; the persisted wire names are kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Cycle through hosts in order, one per selection
    #[default]
    RoundRobin,
    /// Uniform random pick over the (health-filtered) pool
    Random,
    /// Always the first host of the current pool, re-derived each call
    Failover,
    /// No distinct rule; falls back to the first pool host (see DESIGN.md)
    HealthBased,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RoundRobin => "round-robin",
            Strategy::Random => "random",
            Strategy::Failover => "failover",
            Strategy::HealthBased => "health-based",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of candidate bastion hosts.
///
/// Host order is significant: `Failover` treats it as priority order and
/// `RoundRobin` indexes into it with the rotation cursor. Removal is by
/// index and shifts subsequent indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BastionGroup {
    #[serde(default)]
    pub hosts: Vec<BastionHost>,

    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default = "default_health_check")]
    pub health_check: bool,
}

impl Default for BastionGroup {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            strategy: Strategy::default(),
            health_check: true,
        }
    }
}

fn default_health_check() -> bool {
    true
}
