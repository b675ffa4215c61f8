//! Configuration system
//!
//! Loads ~/.config/whaletown/config.yaml with support for:
//! - An explicit town root
//! - Known rig names
//! - Overseer identity
//! - Mail defaults

mod town_config;
pub mod validation;

pub use town_config::{MailConfig, OverseerConfig, TownConfig};
pub use validation::{config_warnings, validate_config, validate_config_result, ValidationError};
