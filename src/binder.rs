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

//! Connect-event hook: resolves a profile's bastion group, runs a
//! selection, and injects the chosen host as a jump hop.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::config::ConfigStore;
use crate::error::BastionError;
use crate::selector::Selector;

/// Store key prefix for `profile id -> group name` assignments.
pub const PROFILE_KEY_PREFIX: &str = "profile_bastion.";

/// Connection parameters of the session triggering the connect event.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    pub profile_id: Option<String>,
    pub username: String,
}

/// Authentication method carried on an injected jump hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AuthMethod {
    Agent,
}

/// One jump hop to splice into the outbound connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpHop {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth_method: AuthMethod,
}

/// Patch merged into pending connection parameters before transport
/// negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ConnectionPatch {
    pub jump_hosts: Vec<JumpHop>,
}

/// Collaborator that applies a patch to a pending connection.
#[async_trait]
pub trait ConnectionMutator: Send + Sync {
    async fn apply(&self, session_id: &str, patch: ConnectionPatch) -> Result<()>;
}

/// The `profile id -> group name` assignment table.
///
/// Selection is opt-in per profile: a profile without an entry here is
/// left untouched by the connect hook.
pub struct ProfileAssignments {
    store: Arc<ConfigStore>,
}

impl ProfileAssignments {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self { store }
    }

    fn key(profile_id: &str) -> String {
        format!("{PROFILE_KEY_PREFIX}{profile_id}")
    }

    pub async fn get(&self, profile_id: &str) -> Option<String> {
        self.store.get(&Self::key(profile_id)).await
    }

    pub async fn assign(&self, profile_id: &str, group: &str) -> Result<()> {
        self.store
            .set(&Self::key(profile_id), &group.to_string())
            .await
    }

    pub async fn unassign(&self, profile_id: &str) -> Result<()> {
        self.store.remove(&Self::key(profile_id)).await
    }
}

/// Applies bastion rotation on connect events.
pub struct ConnectionBinder {
    assignments: ProfileAssignments,
    selector: Selector,
    mutator: Arc<dyn ConnectionMutator>,
}

impl ConnectionBinder {
    pub fn new(store: Arc<ConfigStore>, mutator: Arc<dyn ConnectionMutator>) -> Self {
        Self {
            assignments: ProfileAssignments::new(store.clone()),
            selector: Selector::new(store),
            mutator,
        }
    }

    /// Replace the selector (tests inject one with a stub probe).
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Connect-event entry point.
    ///
    /// Never propagates an error: failures inside the hook are logged and
    /// swallowed so connection establishment and other hooks proceed.
    pub async fn on_connect(&self, session: &SessionInfo) {
        if let Err(err) = self.apply_rotation(session).await {
            tracing::error!(
                session = %session.id,
                error = %format!("{err:#}"),
                "bastion rotation hook failed"
            );
        }
    }

    async fn apply_rotation(&self, session: &SessionInfo) -> Result<()> {
        let Some(profile_id) = &session.profile_id else {
            return Ok(());
        };

        // No assignment means this profile opted out of rotation
        let Some(group_name) = self.assignments.get(profile_id).await else {
            return Ok(());
        };

        let host = match self.selector.select_next(&group_name).await {
            Ok(host) => host,
            Err(err)
                if matches!(
                    err.downcast_ref::<BastionError>(),
                    Some(BastionError::GroupNotFound { .. })
                ) =>
            {
                // Assignment points at a deleted group; skip, non-fatal
                tracing::warn!(
                    profile = %profile_id,
                    group = %group_name,
                    "assigned bastion group not found, skipping rotation"
                );
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        tracing::info!(group = %group_name, host = %host.host, "using bastion for connection");

        let patch = ConnectionPatch {
            jump_hosts: vec![JumpHop {
                host: host.host.clone(),
                port: host.port,
                username: host.effective_user(&session.username),
                auth_method: AuthMethod::Agent,
            }],
        };

        self.mutator.apply(&session.id, patch).await
    }
}
