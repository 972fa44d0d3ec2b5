//! Persistence collaborators.
//!
//! Two stores sit behind traits here:
//! - [`DesignStore`], the remote, authenticated store of named designs
//! - [`LocalStore`], a key-value fallback used while offline
//!
//! Both have in-memory implementations for tests and embedding, and the
//! local store also has a file-backed one.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use cakekit_core::{
    thread_safe_rw, thread_safe_rw_map, PersistenceError, StoreError, ThreadSafeRw,
    ThreadSafeRwMap,
};

use crate::external::ExternalDesignRecord;

/// Key used for the local fallback when none is configured.
pub const DEFAULT_LOCAL_KEY: &str = "saved_design";

/// Bearer credential for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: None,
        }
    }

    pub fn expiring_at(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: Some(expires_at),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// A token is usable when it is non-empty and not yet expired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.trim().is_empty() && self.expires_at.map_or(true, |at| now < at)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Everything sent to the remote store on save.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignDraft {
    pub record: ExternalDesignRecord,
    /// Encoded preview image, when a capture was available.
    pub preview_image: Option<Vec<u8>>,
}

/// Acknowledgement of a remote save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedDesign {
    pub id: String,
    pub saved_at: DateTime<Utc>,
}

/// Remote store of named designs.
#[async_trait]
pub trait DesignStore: Send + Sync {
    async fn save(
        &self,
        token: &SessionToken,
        draft: DesignDraft,
    ) -> Result<SavedDesign, PersistenceError>;

    async fn load(
        &self,
        token: &SessionToken,
        design_id: &str,
    ) -> Result<ExternalDesignRecord, PersistenceError>;
}

/// Captures an encoded preview of the current scene.
///
/// Returning `None` is not an error; the design is saved without a preview.
pub trait PreviewCapture: Send + Sync {
    fn capture(&self) -> Option<Vec<u8>>;
}

impl<F> PreviewCapture for F
where
    F: Fn() -> Option<Vec<u8>> + Send + Sync,
{
    fn capture(&self) -> Option<Vec<u8>> {
        self()
    }
}

/// In-process [`DesignStore`] that accepts any valid token.
#[derive(Clone)]
pub struct MemoryDesignStore {
    designs: ThreadSafeRwMap<String, ExternalDesignRecord>,
    previews: ThreadSafeRwMap<String, Vec<u8>>,
}

impl MemoryDesignStore {
    pub fn new() -> Self {
        Self {
            designs: thread_safe_rw_map(),
            previews: thread_safe_rw_map(),
        }
    }

    /// Seed a design under a fixed id.
    pub fn insert(&self, id: impl Into<String>, record: ExternalDesignRecord) {
        let id = id.into();
        let record = ExternalDesignRecord {
            id: Some(id.clone()),
            ..record
        };
        self.designs.write().insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.designs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.read().is_empty()
    }

    pub fn preview(&self, id: &str) -> Option<Vec<u8>> {
        self.previews.read().get(id).cloned()
    }

    fn authorize(token: &SessionToken) -> Result<(), PersistenceError> {
        if token.is_valid() {
            Ok(())
        } else {
            Err(PersistenceError::unauthenticated("session token expired"))
        }
    }
}

impl Default for MemoryDesignStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DesignStore for MemoryDesignStore {
    async fn save(
        &self,
        token: &SessionToken,
        draft: DesignDraft,
    ) -> Result<SavedDesign, PersistenceError> {
        Self::authorize(token)?;

        let id = uuid::Uuid::new_v4().simple().to_string();
        let saved_at = Utc::now();
        let record = ExternalDesignRecord {
            id: Some(id.clone()),
            created_at: draft.record.created_at.or(Some(saved_at)),
            saved_at: Some(saved_at),
            ..draft.record
        };

        self.designs.write().insert(id.clone(), record);
        if let Some(preview) = draft.preview_image {
            self.previews.write().insert(id.clone(), preview);
        }
        Ok(SavedDesign { id, saved_at })
    }

    async fn load(
        &self,
        token: &SessionToken,
        design_id: &str,
    ) -> Result<ExternalDesignRecord, PersistenceError> {
        Self::authorize(token)?;
        self.designs
            .read()
            .get(design_id)
            .cloned()
            .ok_or_else(|| PersistenceError::NotFound {
                id: design_id.to_string(),
            })
    }
}

/// Key-value fallback store for offline saves.
pub trait LocalStore: Send + Sync {
    fn put(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Read a value; a missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keys become file names, so only a conservative alphabet is accepted.
fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// [`LocalStore`] keeping one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    dir: PathBuf,
}

impl FileLocalStore {
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn io_error(key: &str, e: impl fmt::Display) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            reason: e.to_string(),
        }
    }
}

impl LocalStore for FileLocalStore {
    fn put(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let body = serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))?;

        tracing::debug!("Stored {} at {}", key, path.display());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key)?;
        let body = match fs::read_to_string(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| StoreError::Serialization {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// In-memory [`LocalStore`].
#[derive(Debug, Clone)]
pub struct MemoryLocalStore {
    values: ThreadSafeRw<HashMap<String, Value>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self {
            values: thread_safe_rw(HashMap::new()),
        }
    }
}

impl Default for MemoryLocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryLocalStore {
    fn put(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.write().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.values.write().remove(key);
        Ok(())
    }
}
