//! Async load/save coordination against the remote store.
//!
//! Each load is tagged with a generation number. When its result arrives,
//! the result is installed only if no newer load (or local restore) began
//! meanwhile; the comparison runs inside the session lock, so a stale
//! result can never overwrite a newer one. The loading flag stays raised
//! while any load is in flight and is cleared on every exit path,
//! including a dropped future.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cakekit_core::{
    thread_safe, AppEvent, PersistenceError, PersistenceEvent, StoreError, ThreadSafe,
};

use crate::actions::DesignAction;
use crate::external::ExternalDesignRecord;
use crate::persistence::{
    DesignDraft, DesignStore, LocalStore, PreviewCapture, SavedDesign, SessionToken,
    DEFAULT_LOCAL_KEY,
};
use crate::session::DesignSession;
use crate::snapshot::{decode, encode, Snapshot};

/// Result of a load that reached the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The loaded design is now the live design.
    Applied {
        design_id: String,
        generation: u64,
        snapshot: Snapshot,
    },
    /// A newer load began before this one finished; nothing changed.
    Superseded {
        design_id: String,
        generation: u64,
        latest: u64,
    },
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied { .. })
    }

    pub fn generation(&self) -> u64 {
        match self {
            LoadOutcome::Applied { generation, .. } | LoadOutcome::Superseded { generation, .. } => {
                *generation
            }
        }
    }
}

/// User-facing details of a remote save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveRequest {
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

impl SaveRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Keeps the session's loading flag raised while alive.
struct LoadingGuard {
    session: DesignSession,
    in_flight: ThreadSafe<usize>,
}

impl LoadingGuard {
    fn begin(session: &DesignSession, in_flight: &ThreadSafe<usize>) -> Self {
        let mut count = in_flight.lock();
        *count += 1;
        if *count == 1 {
            session.dispatch(DesignAction::SetLoading(true));
        }
        Self {
            session: session.clone(),
            in_flight: in_flight.clone(),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut count = self.in_flight.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.session.dispatch(DesignAction::SetLoading(false));
        }
    }
}

/// Coordinates remote loads and saves for one [`DesignSession`].
pub struct LoadCoordinator<S: DesignStore> {
    session: DesignSession,
    store: Arc<S>,
    preview: Option<Arc<dyn PreviewCapture>>,
    token: ThreadSafe<Option<SessionToken>>,
    generation: Arc<AtomicU64>,
    in_flight: ThreadSafe<usize>,
    local_key: String,
}

impl<S: DesignStore> Clone for LoadCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            store: self.store.clone(),
            preview: self.preview.clone(),
            token: self.token.clone(),
            generation: self.generation.clone(),
            in_flight: self.in_flight.clone(),
            local_key: self.local_key.clone(),
        }
    }
}

impl<S: DesignStore> LoadCoordinator<S> {
    pub fn new(session: DesignSession, store: Arc<S>) -> Self {
        Self {
            session,
            store,
            preview: None,
            token: thread_safe(None),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: thread_safe(0),
            local_key: DEFAULT_LOCAL_KEY.to_string(),
        }
    }

    pub fn with_preview(mut self, preview: Arc<dyn PreviewCapture>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn with_local_key(mut self, key: impl Into<String>) -> Self {
        self.local_key = key.into();
        self
    }

    pub fn session(&self) -> &DesignSession {
        &self.session
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    pub fn set_session_token(&self, token: SessionToken) {
        *self.token.lock() = Some(token);
    }

    pub fn sign_out(&self) {
        *self.token.lock() = None;
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.lock().as_ref().is_some_and(SessionToken::is_valid)
    }

    /// Generation of the newest load or restore.
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn require_session(&self) -> Result<SessionToken, PersistenceError> {
        match self.token.lock().as_ref() {
            Some(token) if token.is_valid() => Ok(token.clone()),
            Some(_) => Err(PersistenceError::unauthenticated("session expired")),
            None => Err(PersistenceError::unauthenticated("not signed in")),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn notify(&self, event: PersistenceEvent) {
        self.session.events().notify(AppEvent::Persistence(event));
    }

    /// Fetch a design and install it as the live design.
    ///
    /// Fails with `Unauthenticated` before touching any state when no valid
    /// session is set. Store failures are returned as-is unless a newer
    /// load has begun, in which case the call reports `Superseded`.
    pub async fn load(&self, design_id: &str) -> Result<LoadOutcome, PersistenceError> {
        let token = self.require_session()?;
        let generation = self.next_generation();
        let _loading = LoadingGuard::begin(&self.session, &self.in_flight);

        tracing::info!("Loading design {} (#{})", design_id, generation);
        self.notify(PersistenceEvent::LoadStarted {
            design_id: design_id.to_string(),
            generation,
        });

        let result = self.store.load(&token, design_id).await;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let latest = self.latest_generation();
                if latest != generation {
                    return Ok(self.superseded(design_id, generation, latest));
                }
                tracing::warn!("Load of design {} failed: {}", design_id, e);
                self.notify(PersistenceEvent::LoadFailed {
                    design_id: design_id.to_string(),
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let installed = self.session.apply_if_then(
            |_| self.generation.load(Ordering::SeqCst) == generation,
            vec![
                DesignAction::InstallDesign(Box::new(record.to_design())),
                DesignAction::Checkpoint,
            ],
            |state| encode(&state.design),
        );

        let Some(snapshot) = installed else {
            return Ok(self.superseded(design_id, generation, self.latest_generation()));
        };

        tracing::info!("Loaded design {} (#{})", design_id, generation);
        self.notify(PersistenceEvent::LoadApplied {
            design_id: design_id.to_string(),
            generation,
        });
        Ok(LoadOutcome::Applied {
            design_id: design_id.to_string(),
            generation,
            snapshot,
        })
    }

    fn superseded(&self, design_id: &str, generation: u64, latest: u64) -> LoadOutcome {
        tracing::debug!(
            "Discarding design {} (#{} superseded by #{})",
            design_id,
            generation,
            latest
        );
        self.notify(PersistenceEvent::LoadSuperseded {
            design_id: design_id.to_string(),
            generation,
            latest,
        });
        LoadOutcome::Superseded {
            design_id: design_id.to_string(),
            generation,
            latest,
        }
    }

    /// Send the live design to the remote store. History is not touched.
    pub async fn save(&self, request: SaveRequest) -> Result<SavedDesign, PersistenceError> {
        let token = self.require_session()?;

        let design = self.session.design();
        let record = ExternalDesignRecord::from_design(&design).with_details(
            request.name,
            request.description,
            request.is_public,
        );
        let preview_image = self.preview.as_ref().and_then(|p| p.capture());
        if preview_image.is_none() {
            tracing::debug!("Saving without a preview image");
        }

        let saved = self
            .store
            .save(
                &token,
                DesignDraft {
                    record,
                    preview_image,
                },
            )
            .await
            .inspect_err(|e| tracing::warn!("Save failed: {}", e))?;

        tracing::info!("Saved design {}", saved.id);
        self.notify(PersistenceEvent::Saved {
            id: saved.id.clone(),
        });
        Ok(saved)
    }

    /// Write the full live snapshot to the local fallback store.
    pub fn save_local(&self, store: &dyn LocalStore) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(self.session.snapshot()).map_err(|e| StoreError::Serialization {
                key: self.local_key.clone(),
                reason: e.to_string(),
            })?;
        store.put(&self.local_key, &value)?;

        self.notify(PersistenceEvent::SavedLocally {
            key: self.local_key.clone(),
        });
        Ok(())
    }

    /// Install the locally saved snapshot, if any. Returns whether one was
    /// found. A restore supersedes any load still in flight.
    pub fn restore_local(&self, store: &dyn LocalStore) -> Result<bool, StoreError> {
        let Some(value) = store.get(&self.local_key)? else {
            tracing::debug!("Nothing saved locally under {}", self.local_key);
            return Ok(false);
        };

        let design = decode(&Snapshot::from_json_value(&value));
        self.next_generation();
        self.session.apply_if(
            |_| true,
            vec![
                DesignAction::InstallDesign(Box::new(design)),
                DesignAction::Checkpoint,
            ],
        );

        tracing::info!("Restored design from local key {}", self.local_key);
        self.notify(PersistenceEvent::RestoredLocally {
            key: self.local_key.clone(),
        });
        Ok(true)
    }
}
