//! Configuration and settings management for CakeKit
//!
//! Provides configuration file handling, defaults, and validation.
//! Supports JSON and TOML file formats, chosen by file extension.
//!
//! Configuration is organized into logical sections:
//! - Pricing rules used for quotes
//! - Persistence (local fallback store location and key)
//! - Event bus sizing
//! - Logging level

use cakekit_core::EventBusConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

const APP_DIR: &str = "cakekit";

/// Pricing rules for quotes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Charged for the base item when it carries no price
    pub base_price: f64,
    /// Charged for an element when it carries no price
    pub default_element_price: f64,
    /// Charged once for a non-blank message
    pub message_surcharge: f64,
    /// Sales tax rate, in [0, 1)
    pub tax_rate: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            base_price: 25.0,
            default_element_price: 3.5,
            message_surcharge: 5.0,
            tax_rate: 0.08,
        }
    }
}

/// Local fallback store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Directory holding one JSON file per saved key
    pub local_store_dir: PathBuf,
    /// Key the live design is saved under
    pub local_key: String,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            local_store_dir: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
                .join("drafts"),
            local_key: "saved_design".to_string(),
        }
    }
}

/// Event bus sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    /// Broadcast channel capacity
    pub channel_capacity: usize,
    /// Keep a bounded history of published events
    pub enable_history: bool,
    /// Maximum number of retained events
    pub max_history_size: usize,
    /// Seconds an event stays in history
    pub history_retention_secs: u64,
}

impl Default for EventSettings {
    fn default() -> Self {
        let bus = EventBusConfig::default();
        Self {
            channel_capacity: bus.channel_capacity,
            enable_history: bus.enable_history,
            max_history_size: bus.max_history_size,
            history_retention_secs: bus.history_retention.as_secs(),
        }
    }
}

impl EventSettings {
    pub fn to_bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            channel_capacity: self.channel_capacity,
            enable_history: self.enable_history,
            max_history_size: self.max_history_size,
            history_retention: Duration::from_secs(self.history_retention_secs),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
/// Every section is optional in a file and falls back to its defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Pricing rules
    pub pricing: PricingSettings,
    /// Local persistence
    pub persistence: PersistenceSettings,
    /// Event bus
    pub events: EventSettings,
    /// Logging
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load config from `path` if it exists, otherwise defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let prices = [
            ("pricing.base_price", self.pricing.base_price),
            (
                "pricing.default_element_price",
                self.pricing.default_element_price,
            ),
            ("pricing.message_surcharge", self.pricing.message_surcharge),
        ];
        for (key, value) in prices {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        let tax = self.pricing.tax_rate;
        if !(0.0..1.0).contains(&tax) {
            return Err(ConfigError::out_of_range("pricing.tax_rate", tax));
        }

        if self.persistence.local_key.trim().is_empty() {
            return Err(ConfigError::MissingKey("persistence.local_key".to_string()));
        }

        if self.events.channel_capacity == 0 {
            return Err(ConfigError::out_of_range("events.channel_capacity", 0));
        }

        if self.events.enable_history && self.events.max_history_size == 0 {
            return Err(ConfigError::out_of_range("events.max_history_size", 0));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingKey("logging.level".to_string()));
        }

        Ok(())
    }
}
