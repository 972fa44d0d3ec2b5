//! CakeKit Settings Crate
//!
//! Handles application configuration: loading, validation and saving of the
//! pricing, persistence, event bus and logging sections.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, EventSettings, LoggingSettings, PersistenceSettings,
    PricingSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
