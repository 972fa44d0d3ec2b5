//! Shared handle over the live design state.
//!
//! A [`DesignSession`] owns the only [`DesignState`]; every mutation goes
//! through [`reduce`] under one lock, so commits never interleave. After
//! each action the session publishes a [`DesignEvent`] so that a renderer
//! can re-read the live design.

use std::sync::Arc;

use cakekit_core::{thread_safe, AppEvent, DesignEvent, EventBus, ThreadSafe};

use crate::actions::{ActionMessage, DesignAction};
use crate::design::Design;
use crate::reducer::{reduce, DesignState};
use crate::snapshot::{encode, ElementRecord, Snapshot};

/// Cloneable handle to one design being edited.
#[derive(Clone)]
pub struct DesignSession {
    state: ThreadSafe<DesignState>,
    events: Arc<EventBus>,
}

impl DesignSession {
    /// Create a session with a private event bus.
    pub fn new() -> Self {
        Self::with_event_bus(Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(events: Arc<EventBus>) -> Self {
        Self {
            state: thread_safe(DesignState::default()),
            events,
        }
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Apply one action.
    pub fn dispatch(&self, action: DesignAction) {
        let notifications = {
            let mut state = self.state.lock();
            Self::apply(&mut state, action)
        };
        self.publish(notifications);
    }

    /// Apply a wire message. Returns false when the message was ignored.
    pub fn dispatch_message(&self, message: &ActionMessage) -> bool {
        match DesignAction::from_message(message) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Apply `actions` in one critical section if `predicate` holds for the
    /// current state. Returns whether they were applied.
    pub fn apply_if<P>(&self, predicate: P, actions: Vec<DesignAction>) -> bool
    where
        P: FnOnce(&DesignState) -> bool,
    {
        self.apply_if_then(predicate, actions, |_| ()).is_some()
    }

    /// Like [`apply_if`](Self::apply_if), then `read` the resulting state
    /// before the lock is released.
    pub fn apply_if_then<P, R>(
        &self,
        predicate: P,
        actions: Vec<DesignAction>,
        read: impl FnOnce(&DesignState) -> R,
    ) -> Option<R>
    where
        P: FnOnce(&DesignState) -> bool,
    {
        let (result, notifications) = {
            let mut state = self.state.lock();
            if !predicate(&*state) {
                return None;
            }
            let notifications = actions
                .into_iter()
                .flat_map(|action| Self::apply(&mut state, action))
                .collect::<Vec<_>>();
            (read(&*state), notifications)
        };
        self.publish(notifications);
        Some(result)
    }

    fn apply(state: &mut DesignState, action: DesignAction) -> Vec<DesignEvent> {
        let name = action.name();
        let was_loading = state.loading;
        let placement_before = state.design.placement;

        tracing::debug!("Dispatching {}", name);
        *state = reduce(std::mem::take(state), action);

        let mut events = Vec::with_capacity(3);
        if state.loading != was_loading {
            events.push(DesignEvent::LoadingChanged {
                loading: state.loading,
            });
        }
        if state.design.placement != placement_before {
            if let Some(p) = state.design.placement {
                events.push(DesignEvent::PlacementUpdated {
                    top_y: p.top_y,
                    center_x: p.center_x,
                    center_z: p.center_z,
                    radius: p.radius,
                });
            }
        }
        events.push(DesignEvent::StateChanged {
            action: name.to_string(),
            current_index: state.history.current_index(),
            history_len: state.history.len(),
            element_count: state.design.elements.len(),
        });
        events
    }

    fn publish(&self, notifications: Vec<DesignEvent>) {
        for event in notifications {
            self.events.notify(AppEvent::Design(event));
        }
    }

    /// Read the state without cloning it.
    pub fn with_state<R>(&self, read: impl FnOnce(&DesignState) -> R) -> R {
        let state = self.state.lock();
        read(&*state)
    }

    pub fn state(&self) -> DesignState {
        self.state.lock().clone()
    }

    pub fn design(&self) -> Design {
        self.with_state(|s| s.design.clone())
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with_state(|s| encode(&s.design))
    }

    pub fn can_undo(&self) -> bool {
        self.with_state(DesignState::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.with_state(DesignState::can_redo)
    }

    pub fn is_loading(&self) -> bool {
        self.with_state(|s| s.loading)
    }

    pub fn history_len(&self) -> usize {
        self.with_state(|s| s.history.len())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.with_state(|s| s.history.current_index())
    }

    /// Plain records of the given live elements, in design order, for a
    /// clipboard. Unknown ids are skipped.
    pub fn copy_elements(&self, unique_ids: &[&str]) -> Vec<ElementRecord> {
        self.with_state(|s| {
            s.design
                .live_elements()
                .filter(|e| unique_ids.contains(&e.unique_id()))
                .map(ElementRecord::from_model)
                .collect()
        })
    }
}

impl Default for DesignSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DesignSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DesignSession")
            .field("elements", &state.design.elements.len())
            .field("history_len", &state.history.len())
            .field("current_index", &state.history.current_index())
            .field("loading", &state.loading)
            .finish()
    }
}
