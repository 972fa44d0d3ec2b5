//! # CakeKit Core
//!
//! Core types, traits, and utilities for CakeKit.
//! Provides the error taxonomy shared by every layer, the application
//! event bus used to notify renderers and other subscribers of design
//! changes, and the shared-state type aliases.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{PersistenceError, StoreError};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, DesignEvent, EventBus, EventBusConfig, EventCategory, EventFilter,
    PersistenceEvent, SubscriptionId,
};

pub use types::{
    thread_safe, thread_safe_rw, thread_safe_rw_map, ThreadSafe, ThreadSafeRw, ThreadSafeRwMap,
};
