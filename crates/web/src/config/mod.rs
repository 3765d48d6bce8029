//! Configuration for the Ad Wizard control panel host.
//! This module handles loading and validating the
//! ~/.config/adwizard/config.json configuration file.

mod io;
mod model;
mod validation;

pub use io::{CONFIG_PATH_ENV, default_config_path, expand_tilde, load_config, load_config_from_path};
pub use model::{AdWizardConfig, ConfigError};
pub use validation::validate_config;
