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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BastionError;

/// A single bastion (jump) host within a group.
///
/// Identity is positional: a host is addressed by its index in the owning
/// group's ordered list, so two entries with identical fields are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BastionHost {
    /// Hostname or IP address of the bastion
    pub host: String,
    /// SSH port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username for the jump hop (None means use the session username)
    #[serde(default)]
    pub user: Option<String>,
}

fn default_port() -> u16 {
    22
}

impl BastionHost {
    pub fn new(host: impl Into<String>, port: u16, user: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            user,
        }
    }

    /// Parse a `[user@]host[:port]` specification.
    ///
    /// Bracketed IPv6 literals are supported: `[::1]:2222` or `admin@[::1]`.
    /// The port must be a non-zero u16; an unparsable port is rejected
    /// rather than silently folded into the hostname.
    pub fn parse(spec: &str) -> Result<Self, BastionError> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(BastionError::invalid_host(spec, "empty host specification"));
        }

        // Split on the first '@' to separate user from host:port
        let (user, host_port) = match trimmed.split_once('@') {
            Some((user, rest)) => {
                if user.is_empty() {
                    return Err(BastionError::invalid_host(spec, "empty username"));
                }
                (Some(user.to_string()), rest)
            }
            None => (None, trimmed),
        };

        let (host, port) = parse_host_port(spec, host_port)?;

        Ok(Self { host, port, user })
    }

    /// The effective username for a jump hop: the host's own user when set,
    /// otherwise the connecting session's username.
    pub fn effective_user(&self, session_user: &str) -> String {
        self.user
            .clone()
            .unwrap_or_else(|| session_user.to_string())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for BastionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{}@{}:{}", user, self.host, self.port),
            None => write!(f, "{}:{}", self.host, self.port),
        }
    }
}

/// Parse the `host[:port]` part of a specification.
///
/// Handles:
/// * `hostname` -> (hostname, 22)
/// * `hostname:port` -> (hostname, port)
/// * `[::1]` -> (::1, 22)
/// * `[::1]:port` -> (::1, port)
fn parse_host_port(spec: &str, host_port: &str) -> Result<(String, u16), BastionError> {
    if host_port.is_empty() {
        return Err(BastionError::invalid_host(spec, "empty hostname"));
    }

    // IPv6 addresses in brackets
    if let Some(rest) = host_port.strip_prefix('[') {
        let Some(bracket_end) = rest.find(']') else {
            return Err(BastionError::invalid_host(
                spec,
                "unclosed bracket in IPv6 address",
            ));
        };
        let addr = &rest[..bracket_end];
        if addr.is_empty() {
            return Err(BastionError::invalid_host(spec, "empty IPv6 address"));
        }
        let remaining = &rest[bracket_end + 1..];
        if remaining.is_empty() {
            return Ok((addr.to_string(), 22));
        }
        let Some(port_str) = remaining.strip_prefix(':') else {
            return Err(BastionError::invalid_host(
                spec,
                format!("unexpected characters after IPv6 address: '{remaining}'"),
            ));
        };
        return Ok((addr.to_string(), parse_port(spec, port_str)?));
    }

    // Regular hostname[:port]; the port is everything after the last colon
    match host_port.rfind(':') {
        Some(colon_pos) => {
            let host = &host_port[..colon_pos];
            let port_str = &host_port[colon_pos + 1..];
            if host.is_empty() {
                return Err(BastionError::invalid_host(spec, "empty hostname"));
            }
            Ok((host.to_string(), parse_port(spec, port_str)?))
        }
        None => Ok((host_port.to_string(), 22)),
    }
}

fn parse_port(spec: &str, port_str: &str) -> Result<u16, BastionError> {
    if port_str.is_empty() {
        return Err(BastionError::invalid_host(spec, "empty port"));
    }
    let port = port_str
        .parse::<u16>()
        .map_err(|_| BastionError::invalid_host(spec, format!("invalid port number '{port_str}'")))?;
    if port == 0 {
        return Err(BastionError::invalid_host(spec, "port number cannot be zero"));
    }
    Ok(port)
}
