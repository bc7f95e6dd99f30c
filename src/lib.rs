pub mod binder;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod host;
pub mod probe;
pub mod registry;
pub mod rotation;
pub mod selector;
pub mod utils;

pub use cli::Cli;
pub use config::{BastionGroup, ConfigStore, Strategy};
pub use error::BastionError;
pub use host::BastionHost;
pub use selector::Selector;
