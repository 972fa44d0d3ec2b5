//! # CakeKit
//!
//! A versioned design-state engine for composing customizable cakes:
//! - A base item plus decorative elements and a written message
//! - Linear undo/redo history of plain snapshots
//! - Async remote load/save with stale-result detection
//! - Offline fallback store and itemized price quotes
//!
//! ## Architecture
//!
//! CakeKit is organized as a workspace with multiple crates:
//!
//! 1. **cakekit-core** - Error taxonomy, event bus, shared-state aliases
//! 2. **cakekit-designer** - Models, snapshot codec, history, reducer,
//!    session, load coordinator, pricing
//! 3. **cakekit-settings** - Configuration files and validation
//! 4. **cakekit** - This crate: logging setup, [`Workbench`] assembly and
//!    the action-script runner binary

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

pub use cakekit_designer as designer;
pub use cakekit_settings as settings;

pub use cakekit_core::{
    AppEvent, DesignEvent, EventBus, EventCategory, EventFilter, PersistenceError,
    PersistenceEvent, StoreError,
};
pub use cakekit_designer::{
    ActionMessage, Design, DesignAction, DesignSession, DesignStore, FileLocalStore,
    LoadCoordinator, LoadOutcome, LocalStore, PricingRules, Quote, SaveRequest, SessionToken,
    Snapshot,
};
pub use cakekit_settings::{Config, LoggingSettings, PricingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from the logging settings
///
/// Sets up structured logging with:
/// - `RUST_LOG` environment variable support, falling back to the
///   configured level
/// - Pretty or JSON output on stderr, keeping stdout for results
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("invalid log level '{}'", settings.level))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if settings.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()
    };

    result.context("a global tracing subscriber is already installed")
}

/// Quote rules from the pricing settings section.
pub fn pricing_rules(settings: &PricingSettings) -> PricingRules {
    PricingRules {
        base_price: settings.base_price,
        default_element_price: settings.default_element_price,
        message_surcharge: settings.message_surcharge,
        tax_rate: settings.tax_rate,
    }
}

/// Counts from replaying an action script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub ignored: usize,
}

/// A configured design session with its event bus, pricing rules and
/// local fallback store.
pub struct Workbench {
    config: Config,
    events: Arc<EventBus>,
    session: DesignSession,
    pricing: PricingRules,
    local: FileLocalStore,
}

impl Workbench {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        config.validate().context("invalid configuration")?;

        let events = Arc::new(EventBus::with_config(config.events.to_bus_config()));
        let session = DesignSession::with_event_bus(events.clone());
        let pricing = pricing_rules(&config.pricing);
        let local = FileLocalStore::new(&config.persistence.local_store_dir);

        tracing::debug!(
            "Workbench ready (local store at {})",
            local.dir().display()
        );
        Ok(Self {
            config,
            events,
            session,
            pricing,
            local,
        })
    }

    /// Load the configuration at `path` (defaults when absent) and build
    /// a workbench from it.
    pub fn from_config_file(path: &Path) -> anyhow::Result<Self> {
        let config = Config::load_or_default(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        Self::from_config(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn session(&self) -> &DesignSession {
        &self.session
    }

    pub fn local_store(&self) -> &FileLocalStore {
        &self.local
    }

    pub fn quote(&self) -> Quote {
        self.session
            .with_state(|state| Quote::for_design(&state.design, &self.pricing))
    }

    /// Coordinator for `store` sharing this workbench's session and local key.
    pub fn coordinator<S: DesignStore>(&self, store: Arc<S>) -> LoadCoordinator<S> {
        LoadCoordinator::new(self.session.clone(), store)
            .with_local_key(self.config.persistence.local_key.clone())
    }

    /// Dispatch each message in order.
    pub fn replay(&self, messages: &[ActionMessage]) -> ReplayReport {
        let mut report = ReplayReport::default();
        for message in messages {
            if self.session.dispatch_message(message) {
                report.applied += 1;
            } else {
                tracing::warn!("Skipped action '{}'", message.kind);
                report.ignored += 1;
            }
        }
        report
    }
}

/// Parse an action script: a JSON array of messages, or an object with an
/// `actions` array.
pub fn parse_script(body: &str) -> anyhow::Result<Vec<ActionMessage>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Script {
        Bare(Vec<ActionMessage>),
        Wrapped { actions: Vec<ActionMessage> },
    }

    let script: Script = serde_json::from_str(body).context("malformed action script")?;
    Ok(match script {
        Script::Bare(actions) | Script::Wrapped { actions } => actions,
    })
}
