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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Strategy;

#[derive(Parser, Debug)]
#[command(
    name = "bastor",
    version,
    about = "Bastion rotation - health-gated jump host selection for SSH connections",
    long_about = "bastor manages named groups of bastion (jump) hosts and picks the host to use\nfor the next outbound SSH connection according to the group's rotation strategy.\nSelection can be gated on live reachability: unreachable hosts are filtered out\nof the pool, and if every host fails its probe the full pool is used instead\n(fail-open) so a flaky network never blocks connecting.",
    after_help = "EXAMPLES:\n  Create a group and add hosts:   bastor group create prod\n                                  bastor group add-host prod admin@bastion1.example.com:2222\n                                  bastor group add-host prod bastion2\n  Choose the rotation strategy:   bastor group set-strategy prod round-robin\n  Bind a connection profile:      bastor assign my-profile prod\n  Pick the next bastion:          bastor next prod\n  Check reachability:             bastor ping prod"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        help = "Store file path [default: $XDG_CONFIG_HOME/bastor/store.json]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        default_value = "5",
        help = "Health probe timeout in seconds (shared deadline for one probe round)"
    )]
    pub timeout: u64,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Manage bastion groups")]
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    #[command(
        about = "Assign a bastion group to a connection profile",
        long_about = "Binds a connection profile to a bastion group. Connections made through the\nprofile rotate through the group's hosts; profiles without an assignment are\nleft untouched."
    )]
    Assign {
        #[arg(help = "Connection profile identifier")]
        profile: String,
        #[arg(help = "Bastion group name")]
        group: String,
    },

    #[command(about = "Remove a profile's bastion group assignment")]
    Unassign {
        #[arg(help = "Connection profile identifier")]
        profile: String,
    },

    #[command(
        about = "Select the next bastion from a group",
        long_about = "Runs one selection against the group and prints the chosen host. This is a\nreal selection: for round-robin groups the rotation cursor advances."
    )]
    Next {
        #[arg(help = "Bastion group name")]
        group: String,
    },

    #[command(about = "Test reachability of every host in a group")]
    Ping {
        #[arg(help = "Bastion group name")]
        group: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupAction {
    #[command(about = "Create a new bastion group (round-robin, health check on)")]
    Create {
        #[arg(help = "Group name, e.g. prod-bastions")]
        name: String,
    },

    #[command(about = "Delete a group and its rotation state")]
    Delete {
        name: String,
    },

    #[command(about = "List configured groups")]
    List,

    #[command(about = "Show a group's hosts and settings")]
    Show {
        name: String,
    },

    #[command(about = "Add a host to a group")]
    AddHost {
        group: String,
        #[arg(help = "Host in [user@]host[:port] format, e.g. admin@bastion1.example.com:2222")]
        host: String,
    },

    #[command(about = "Remove a host from a group by index")]
    RemoveHost {
        group: String,
        #[arg(help = "Zero-based host index as shown by 'group show'")]
        index: usize,
    },

    #[command(about = "Set the rotation strategy for a group")]
    SetStrategy {
        group: String,
        #[arg(value_enum, help = "round-robin, random, failover, or health-based")]
        strategy: Strategy,
    },

    #[command(about = "Toggle reachability gating for a group")]
    ToggleHealth {
        group: String,
    },
}
