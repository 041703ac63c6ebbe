//! Subcommand implementations.

pub mod config;
pub mod describe;
pub mod providers;

use std::path::Path;
use vigil_core::{Config, ConfigError};

/// Load the config from `path`, or from the default location when unset.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
