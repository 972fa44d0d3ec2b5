use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use cakekit_core::{AppEvent, EventCategory, EventFilter, PersistenceError};
use cakekit_designer::{
    DesignDraft, DesignSession, DesignStore, ExternalDesignRecord, LoadCoordinator, LoadOutcome,
    MemoryDesignStore, Placement, SaveRequest, SavedDesign, SessionToken,
};
use parking_lot::Mutex;
use tokio::sync::oneshot;

type Reply = Result<ExternalDesignRecord, PersistenceError>;

/// Store whose loads block until the test releases them.
#[derive(Default)]
struct GatedStore {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
}

impl GatedStore {
    fn gate(&self, id: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(id.to_string(), rx);
        tx
    }
}

#[async_trait]
impl DesignStore for GatedStore {
    async fn save(
        &self,
        _token: &SessionToken,
        _draft: DesignDraft,
    ) -> Result<SavedDesign, PersistenceError> {
        Err(PersistenceError::Rejected {
            reason: "read-only".into(),
        })
    }

    async fn load(
        &self,
        _token: &SessionToken,
        design_id: &str,
    ) -> Result<ExternalDesignRecord, PersistenceError> {
        let gate = self.gates.lock().remove(design_id);
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(PersistenceError::Transport {
                    reason: "gate dropped".into(),
                })
            }),
            None => Err(PersistenceError::NotFound {
                id: design_id.to_string(),
            }),
        }
    }
}

fn record(message: &str) -> ExternalDesignRecord {
    ExternalDesignRecord {
        message: message.to_string(),
        ..ExternalDesignRecord::default()
    }
}

fn gated_loader() -> Arc<LoadCoordinator<GatedStore>> {
    let loader = LoadCoordinator::new(DesignSession::new(), Arc::new(GatedStore::default()));
    loader.set_session_token(SessionToken::new("token"));
    Arc::new(loader)
}

async fn wait_for_generation(loader: &LoadCoordinator<GatedStore>, generation: u64) {
    while loader.latest_generation() < generation {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_later_load_wins_when_earlier_resolves_last() {
    let loader = gated_loader();
    let release_a = loader.store().gate("A");
    let release_b = loader.store().gate("B");

    let a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    let b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("B").await }
    });
    wait_for_generation(&loader, 2).await;
    assert!(loader.session().is_loading());

    release_b.send(Ok(record("from B"))).unwrap();
    let outcome_b = b.await.unwrap().unwrap();
    assert!(outcome_b.is_applied());
    assert!(loader.session().is_loading());

    release_a.send(Ok(record("from A"))).unwrap();
    let outcome_a = a.await.unwrap().unwrap();
    assert_eq!(
        outcome_a,
        LoadOutcome::Superseded {
            design_id: "A".into(),
            generation: 1,
            latest: 2,
        }
    );

    assert_eq!(loader.session().design().message, "from B");
    assert_eq!(loader.session().history_len(), 1);
    assert!(!loader.session().is_loading());
}

#[tokio::test]
async fn test_stale_result_is_dropped_even_if_first() {
    let loader = gated_loader();
    let release_a = loader.store().gate("A");
    let release_b = loader.store().gate("B");

    let a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    let b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("B").await }
    });
    wait_for_generation(&loader, 2).await;

    release_a.send(Ok(record("from A"))).unwrap();
    assert!(!a.await.unwrap().unwrap().is_applied());
    assert_eq!(loader.session().design().message, "");

    release_b.send(Ok(record("from B"))).unwrap();
    assert!(b.await.unwrap().unwrap().is_applied());
    assert_eq!(loader.session().design().message, "from B");
}

#[tokio::test]
async fn test_stale_failure_reports_superseded() {
    let loader = gated_loader();
    let release_a = loader.store().gate("A");
    let release_b = loader.store().gate("B");

    let a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    let b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("B").await }
    });
    wait_for_generation(&loader, 2).await;

    release_a
        .send(Err(PersistenceError::Transport {
            reason: "timeout".into(),
        }))
        .unwrap();
    assert!(matches!(
        a.await.unwrap(),
        Ok(LoadOutcome::Superseded { .. })
    ));

    release_b.send(Ok(record("from B"))).unwrap();
    assert!(b.await.unwrap().unwrap().is_applied());
}

#[tokio::test]
async fn test_local_edit_during_load_is_kept_until_install() {
    let loader = gated_loader();
    let release = loader.store().gate("A");

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;

    loader
        .session()
        .dispatch(cakekit_designer::DesignAction::SetTopper(Some("stars".into())));
    assert_eq!(loader.session().history_len(), 1);

    release.send(Ok(record("loaded"))).unwrap();
    assert!(task.await.unwrap().unwrap().is_applied());

    let design = loader.session().design();
    assert_eq!(design.message, "loaded");
    assert_eq!(design.topper, None);
    assert_eq!(loader.session().history_len(), 2);
    assert!(loader.session().can_undo());

    // undo lands on the last commit before the load, not on a partial install
    loader.session().dispatch(cakekit_designer::DesignAction::Undo);
    let design = loader.session().design();
    assert_eq!(design.topper.as_deref(), Some("stars"));
    assert_eq!(design.message, "");
}

#[tokio::test]
async fn test_applied_snapshot_matches_installed_design() {
    let loader = gated_loader();
    let release = loader.store().gate("A");
    let placement = Placement {
        top_y: 1.25,
        center_x: 0.0,
        center_z: 0.5,
        radius: 2.0,
    };
    loader
        .session()
        .dispatch(cakekit_designer::DesignAction::UpdatePlacement(placement));

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    release.send(Ok(record("loaded"))).unwrap();

    match task.await.unwrap().unwrap() {
        LoadOutcome::Applied { snapshot, .. } => {
            assert_eq!(snapshot.placement, Some(placement));
            assert_eq!(snapshot, loader.session().snapshot());
        }
        other => panic!("expected an applied load, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lenient_record_still_loads() {
    let loader = gated_loader();
    let release = loader.store().gate("A");
    let stored = ExternalDesignRecord::from_json(
        r#"{
            "message": null,
            "topper": "stars",
            "elements": [{ "path": "models/rose.glb", "price": "12.5", "position": [1, 2] }]
        }"#,
    )
    .unwrap();

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    release.send(Ok(stored)).unwrap();
    assert!(task.await.unwrap().unwrap().is_applied());

    let design = loader.session().design();
    assert_eq!(design.topper.as_deref(), Some("stars"));
    assert_eq!(design.message, "");
    assert_eq!(design.live_elements().count(), 1);
}

#[tokio::test]
async fn test_aborted_load_clears_loading_flag() {
    let loader = gated_loader();
    let _release = loader.store().gate("A");

    let task = tokio::spawn({
        let loader = loader.clone();
        async move { loader.load("A").await }
    });
    wait_for_generation(&loader, 1).await;
    assert!(loader.session().is_loading());

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert!(!loader.session().is_loading());
}

#[tokio::test]
async fn test_unauthenticated_load_changes_nothing() {
    let loader = gated_loader();
    loader.sign_out();

    let err = loader.load("A").await.unwrap_err();

    assert!(matches!(err, PersistenceError::Unauthenticated { .. }));
    assert_eq!(loader.latest_generation(), 0);
    assert_eq!(loader.session().history_len(), 0);
}

#[tokio::test]
async fn test_save_sends_preview_and_publishes() {
    let session = DesignSession::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    session.events().subscribe(
        EventFilter::Categories(vec![EventCategory::Persistence]),
        move |event: AppEvent| sink.lock().push(event.description()),
    );

    let store = Arc::new(MemoryDesignStore::new());
    let loader = LoadCoordinator::new(session.clone(), store.clone())
        .with_preview(Arc::new(|| Some(vec![0x89u8, 0x50, 0x4e, 0x47])));
    loader.set_session_token(SessionToken::new("token"));
    session.dispatch(cakekit_designer::DesignAction::SetMessage("Bon voyage".into()));

    let saved = loader
        .save(SaveRequest {
            name: "Farewell".into(),
            description: "for Sam".into(),
            is_public: false,
        })
        .await
        .unwrap();

    assert_eq!(store.preview(&saved.id), Some(vec![0x89, 0x50, 0x4e, 0x47]));
    assert_eq!(session.history_len(), 1);
    assert_eq!(events.lock().as_slice(), &[format!("Saved design {}", saved.id)]);

    let outcome = loader.load(&saved.id).await.unwrap();
    assert!(outcome.is_applied());
    assert_eq!(session.design().message, "Bon voyage");
}
