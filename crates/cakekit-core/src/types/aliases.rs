//! Type aliases for shared, lock-protected state.
//!
//! The live design is mutated from async load tasks as well as from the
//! caller's thread, so every shared container here is `Send + Sync` and
//! built on `parking_lot` locks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cakekit_core::types::*;
//!
//! // Instead of: Arc<Mutex<DesignState>>
//! let state: ThreadSafe<DesignState> = thread_safe(DesignState::default());
//!
//! // Instead of: Arc<RwLock<HashMap<String, String>>>
//! let entries: ThreadSafeRwMap<String, String> = thread_safe_rw_map();
//! ```

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Used for state where every access is a read-modify-write, such as the
/// live design that the reducer replaces wholesale.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy workloads.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// A thread-safe reader-writer hash map.
pub type ThreadSafeRwMap<K, V> = Arc<RwLock<HashMap<K, V>>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}

/// Create a new empty `ThreadSafeRwMap<K, V>`.
#[inline]
pub fn thread_safe_rw_map<K, V>() -> ThreadSafeRwMap<K, V> {
    Arc::new(RwLock::new(HashMap::new()))
}
