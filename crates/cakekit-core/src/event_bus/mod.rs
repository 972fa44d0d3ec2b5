//! # Event Bus Module
//!
//! Provides a publish/subscribe event bus for decoupled communication
//! between the design engine and its collaborators.
//!
//! ## Overview
//!
//! - The design session publishes a [`DesignEvent`] after every action so
//!   an external renderer can re-read the live design
//! - The load coordinator publishes [`PersistenceEvent`]s for load/save
//!   progress, including discarded (superseded) loads
//! - Subscribers filter by [`EventCategory`] and receive either through a
//!   synchronous handler or an async broadcast receiver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cakekit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Design]),
//!     |event| println!("{}", event.description()),
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
