use std::sync::Arc;

use cakekit_core::StoreError;
use cakekit_designer::{
    DesignAction, DesignSession, FileLocalStore, ItemProps, LoadCoordinator, LocalStore,
    MemoryDesignStore, DEFAULT_LOCAL_KEY,
};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_file_store_put_get_remove() {
    let dir = TempDir::new().unwrap();
    let store = FileLocalStore::new(dir.path().join("nested").join("drafts"));

    assert_eq!(store.get("draft").unwrap(), None);
    store.put("draft", &json!({ "message": "hello" })).unwrap();
    assert!(dir.path().join("nested/drafts/draft.json").exists());
    assert_eq!(store.get("draft").unwrap(), Some(json!({ "message": "hello" })));

    store.put("draft", &json!({ "message": "again" })).unwrap();
    assert_eq!(store.get("draft").unwrap(), Some(json!({ "message": "again" })));

    store.remove("draft").unwrap();
    assert_eq!(store.get("draft").unwrap(), None);
}

#[test]
fn test_file_store_rejects_path_keys() {
    let dir = TempDir::new().unwrap();
    let store = FileLocalStore::new(dir.path());

    let err = store.put("../outside", &json!(1)).unwrap_err();
    assert_eq!(
        err,
        StoreError::InvalidKey {
            key: "../outside".into()
        }
    );
}

#[test]
fn test_file_store_reports_corrupt_json() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
    let store = FileLocalStore::new(dir.path());

    assert!(matches!(
        store.get("broken"),
        Err(StoreError::Serialization { .. })
    ));
}

#[test]
fn test_offline_save_and_restore_through_files() {
    let dir = TempDir::new().unwrap();
    let local = FileLocalStore::new(dir.path());

    let session = DesignSession::new();
    let loader = LoadCoordinator::new(session.clone(), Arc::new(MemoryDesignStore::new()));
    session.dispatch(DesignAction::AddElement(
        ItemProps::new().with_path("models/rose.glb").with_color("#ff0000"),
    ));
    session.dispatch(DesignAction::SetMessage("Offline".into()));
    let saved_ids: Vec<String> = session
        .design()
        .unique_ids()
        .iter()
        .map(|id| id.to_string())
        .collect();

    loader.save_local(&local).unwrap();
    assert!(dir.path().join(format!("{DEFAULT_LOCAL_KEY}.json")).exists());

    let fresh = DesignSession::new();
    let restorer = LoadCoordinator::new(fresh.clone(), Arc::new(MemoryDesignStore::new()));
    assert!(restorer.restore_local(&local).unwrap());

    let design = fresh.design();
    assert_eq!(design.message, "Offline");
    assert_eq!(design.unique_ids(), saved_ids);
    assert_eq!(fresh.history_len(), 1);
    assert!(!fresh.can_undo());
}
