use cakekit_designer::{encode, Design, HistoryBuffer, Snapshot};

fn snapshot_with_message(message: &str) -> Snapshot {
    let design = Design {
        message: message.to_string(),
        ..Design::default()
    };
    encode(&design)
}

#[test]
fn test_branch_is_discarded_on_commit() {
    let mut history = HistoryBuffer::new();
    history.commit(snapshot_with_message("A"));
    history.commit(snapshot_with_message("B"));
    history.undo();
    history.commit(snapshot_with_message("C"));

    assert_eq!(
        history.entries(),
        &[snapshot_with_message("A"), snapshot_with_message("C")]
    );
    assert_eq!(history.current_index(), Some(1));
    assert!(!history.can_redo());
}

#[test]
fn test_boundaries_are_idempotent() {
    let mut history = HistoryBuffer::new();
    history.commit(snapshot_with_message("only"));

    let before = history.clone();
    for _ in 0..3 {
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }
    assert_eq!(history, before);
}

#[test]
fn test_undo_returns_earlier_entries() {
    let mut history = HistoryBuffer::new();
    for message in ["one", "two", "three"] {
        history.commit(snapshot_with_message(message));
    }

    let undone = history.undo().cloned();
    assert_eq!(undone, Some(snapshot_with_message("two")));
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.redo_depth(), 1);
}

#[test]
fn test_reset_then_commit_starts_at_zero() {
    let mut history = HistoryBuffer::new();
    history.commit(snapshot_with_message("a"));
    history.commit(snapshot_with_message("b"));
    history.reset();
    history.commit(snapshot_with_message("c"));

    assert_eq!(history.len(), 1);
    assert_eq!(history.current_index(), Some(0));
}
