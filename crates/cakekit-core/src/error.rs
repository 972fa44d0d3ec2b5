//! Error handling for CakeKit
//!
//! Provides error types for the layers that can actually fail:
//! - Persistence errors (remote save/load collaborator)
//! - Store errors (local key-value fallback store)
//!
//! Malformed snapshots, identity collisions, and stale load results are
//! recovered inside the designer and never surface here. Undo/redo at a
//! history boundary is a no-op, not an error.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Persistence error type
///
/// Represents failures reported by (or on the way to) the remote design
/// store. `Unauthenticated` is the one condition callers are expected to
/// act on, by prompting the user to sign in again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// No valid session is available for the call
    #[error("Authentication required: {reason}")]
    Unauthenticated {
        /// Why the session was rejected.
        reason: String,
    },

    /// The requested design does not exist
    #[error("Design not found: {id}")]
    NotFound {
        /// The design identifier that was requested.
        id: String,
    },

    /// The store refused the request
    #[error("Request rejected: {reason}")]
    Rejected {
        /// The reason given by the store.
        reason: String,
    },

    /// The transport failed before a response arrived
    #[error("Transport error: {reason}")]
    Transport {
        /// The reason for the transport failure.
        reason: String,
    },

    /// The store answered with a record that could not be read
    #[error("Invalid design record: {reason}")]
    InvalidRecord {
        /// The reason the record is unusable.
        reason: String,
    },
}

impl PersistenceError {
    /// Create an authentication failure
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }
}

/// Local store error type
///
/// Represents failures of the offline key-value fallback store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Reading or writing the backing medium failed
    #[error("Store I/O error for key '{key}': {reason}")]
    Io {
        /// The key being accessed.
        key: String,
        /// The underlying failure.
        reason: String,
    },

    /// The stored value could not be encoded or decoded as JSON
    #[error("Store serialization error for key '{key}': {reason}")]
    Serialization {
        /// The key being accessed.
        key: String,
        /// The underlying failure.
        reason: String,
    },

    /// The key is not a valid store key
    #[error("Invalid store key: '{key}'")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },
}
