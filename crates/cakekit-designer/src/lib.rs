//! # CakeKit Designer
//!
//! Versioned state engine for composing a customizable cake design: a base
//! item plus decorative elements and a written message. Every committing
//! edit appends a plain snapshot to a linear history, so any past state can
//! be restored with undo/redo.
//!
//! ## Core Components
//!
//! - **Model registry**: live base item and element models with tolerant
//!   setters (color normalization, region de-duplication, defaults)
//! - **Snapshots**: plain, JSON-safe captures of a design and the codec
//!   that rebuilds live models from them
//! - **History**: snapshot list plus cursor with undo/redo
//! - **Reducer**: the pure state transition function over [`DesignAction`]s
//! - **Session**: shared, lock-protected handle that publishes events
//! - **Loader**: async remote load/save with stale-result detection, plus
//!   the local fallback store
//! - **Pricing**: itemized quotes
//!
//! ## Architecture
//!
//! ```text
//! ActionMessage ──> DesignAction ──> DesignSession
//!                                      └── reduce(DesignState, action)
//!                                            ├── Design (live models)
//!                                            └── HistoryBuffer (Snapshots)
//!
//! LoadCoordinator ──> DesignStore (remote) ──> ExternalDesignRecord
//!                 └─> LocalStore (offline)  ──> Snapshot JSON
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cakekit_designer::{DesignAction, DesignSession, ItemProps};
//!
//! let session = DesignSession::new();
//! session.dispatch(DesignAction::AddElement(
//!     ItemProps::new().with_path("models/rose.glb"),
//! ));
//! session.dispatch(DesignAction::SetMessage("Happy Birthday".into()));
//! session.dispatch(DesignAction::Undo);
//! ```

pub mod actions;
pub mod design;
pub mod external;
pub mod history;
pub mod loader;
pub mod model;
pub mod persistence;
pub mod pricing;
pub mod reducer;
pub mod session;
pub mod snapshot;

pub use actions::{ActionMessage, DesignAction};
pub use design::{Design, DesignElement, Placement};
pub use external::{ExternalDesignRecord, ExternalItem};
pub use history::HistoryBuffer;
pub use loader::{LoadCoordinator, LoadOutcome, SaveRequest};
pub use model::{
    BaseItemModel, BaseItemProperties, ColorInput, ColorSpec, ElementModel, ElementProperties,
    ItemModel, ItemProps, SceneHandle, TextureMap, Vec3,
};
pub use persistence::{
    DesignDraft, DesignStore, FileLocalStore, LocalStore, MemoryDesignStore, MemoryLocalStore,
    PreviewCapture, SavedDesign, SessionToken, DEFAULT_LOCAL_KEY,
};
pub use pricing::{PricingRules, Quote, QuoteLine};
pub use reducer::{reduce, DesignState};
pub use session::DesignSession;
pub use snapshot::{decode, encode, ElementRecord, Snapshot};
