//! Event type definitions for the event bus.
//!
//! This module defines all application events organized by category.
//! Events are designed to be cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Live design and history changes
    Design(DesignEvent),
    /// Remote and local persistence
    Persistence(PersistenceEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Design(_) => EventCategory::Design,
            AppEvent::Persistence(_) => EventCategory::Persistence,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Design(e) => e.description(),
            AppEvent::Persistence(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Design state events.
    Design,
    /// Persistence events.
    Persistence,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Design => write!(f, "Design"),
            EventCategory::Persistence => write!(f, "Persistence"),
        }
    }
}

/// Design state events
///
/// Published after every dispatched action so the renderer can re-read the
/// live design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DesignEvent {
    /// An action was applied to the live design.
    StateChanged {
        /// Wire name of the applied action.
        action: String,
        /// History cursor after the action (`None` when history is empty).
        current_index: Option<usize>,
        /// Number of history entries after the action.
        history_len: usize,
        /// Number of elements in the live design.
        element_count: usize,
    },
    /// The loading flag was raised or cleared.
    LoadingChanged {
        /// Whether a load is in flight.
        loading: bool,
    },
    /// Derived placement geometry was recomputed.
    PlacementUpdated {
        /// Height of the top attachment surface.
        top_y: f64,
        /// Attachment center, X.
        center_x: f64,
        /// Attachment center, Z.
        center_z: f64,
        /// Radius of the attachment surface.
        radius: f64,
    },
}

impl DesignEvent {
    fn description(&self) -> String {
        match self {
            DesignEvent::StateChanged {
                action,
                current_index,
                history_len,
                element_count,
            } => match current_index {
                Some(index) => format!(
                    "{}: history {}/{} ({} elements)",
                    action,
                    index + 1,
                    history_len,
                    element_count
                ),
                None => format!("{}: history empty ({} elements)", action, element_count),
            },
            DesignEvent::LoadingChanged { loading } => {
                format!("Loading: {}", if *loading { "started" } else { "finished" })
            }
            DesignEvent::PlacementUpdated {
                top_y,
                center_x,
                center_z,
                radius,
            } => format!(
                "Placement: top {:.3} at ({:.3}, {:.3}) r={:.3}",
                top_y, center_x, center_z, radius
            ),
        }
    }
}

/// Persistence events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PersistenceEvent {
    /// A remote load was issued.
    LoadStarted {
        /// Requested design id.
        design_id: String,
        /// Generation token of the request.
        generation: u64,
    },
    /// A remote load result was installed as the live design.
    LoadApplied {
        /// Loaded design id.
        design_id: String,
        /// Generation token of the request.
        generation: u64,
    },
    /// A remote load result arrived after a newer load began and was dropped.
    LoadSuperseded {
        /// Requested design id.
        design_id: String,
        /// Generation token of the stale request.
        generation: u64,
        /// Generation token of the newest request.
        latest: u64,
    },
    /// A remote load failed.
    LoadFailed {
        /// Requested design id.
        design_id: String,
        /// Error message describing the failure.
        error: String,
    },
    /// The design was saved to the remote store.
    Saved {
        /// Identifier assigned by the store.
        id: String,
    },
    /// The design was written to the local fallback store.
    SavedLocally {
        /// Store key.
        key: String,
    },
    /// The design was restored from the local fallback store.
    RestoredLocally {
        /// Store key.
        key: String,
    },
}

impl PersistenceEvent {
    fn description(&self) -> String {
        match self {
            PersistenceEvent::LoadStarted {
                design_id,
                generation,
            } => format!("Loading design {} (#{})", design_id, generation),
            PersistenceEvent::LoadApplied {
                design_id,
                generation,
            } => format!("Loaded design {} (#{})", design_id, generation),
            PersistenceEvent::LoadSuperseded {
                design_id,
                generation,
                latest,
            } => format!(
                "Discarded design {} (#{} superseded by #{})",
                design_id, generation, latest
            ),
            PersistenceEvent::LoadFailed { design_id, error } => {
                format!("Load of design {} failed: {}", design_id, error)
            }
            PersistenceEvent::Saved { id } => format!("Saved design {}", id),
            PersistenceEvent::SavedLocally { key } => format!("Saved locally under {}", key),
            PersistenceEvent::RestoredLocally { key } => {
                format!("Restored locally from {}", key)
            }
        }
    }
}
