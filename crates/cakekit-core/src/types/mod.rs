//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for the `Arc<Mutex<T>>` / `Arc<RwLock<T>>`
//!   shapes used by the design session, the event bus, and the in-memory
//!   stores.

pub mod aliases;

pub use aliases::*;
