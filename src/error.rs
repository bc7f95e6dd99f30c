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

//! Error types for bastion group management and selection

use thiserror::Error;

/// Errors that can occur while managing bastion groups or selecting a host
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BastionError {
    /// Group name already taken (e.g., `group create prod` twice)
    #[error("bastion group '{name}' already exists")]
    DuplicateGroup { name: String },

    /// Group does not exist in the registry
    #[error("bastion group '{name}' not found")]
    GroupNotFound { name: String },

    /// Host index past the end of the group's host list
    #[error("host index {index} out of range for group '{group}' ({len} hosts)")]
    IndexOutOfRange {
        group: String,
        index: usize,
        len: usize,
    },

    /// Malformed `[user@]host[:port]` specification
    #[error("invalid host specification '{spec}': {reason}")]
    InvalidHostFormat { spec: String, reason: String },

    /// Selection requested for a group with no configured hosts
    #[error("bastion group '{group}' has no hosts configured")]
    NoHostsAvailable { group: String },
}

impl BastionError {
    pub(crate) fn invalid_host(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidHostFormat {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}
