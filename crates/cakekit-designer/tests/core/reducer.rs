use cakekit_designer::{
    ActionMessage, DesignAction, DesignSession, ElementProperties, ItemModel, ItemProps, Placement,
};
use serde_json::json;

fn message(body: serde_json::Value) -> ActionMessage {
    serde_json::from_value(body).expect("valid action message")
}

fn element_snapshot(session: &DesignSession) -> Vec<(String, ElementProperties)> {
    session
        .design()
        .live_elements()
        .map(|e| (e.unique_id().to_string(), e.get_properties()))
        .collect()
}

#[test]
fn test_reset_add_add_undo_redo_scenario() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetMessage("old".into()));
    session.dispatch(DesignAction::Reset);

    for path in ["p1", "p2"] {
        assert!(session.dispatch_message(&message(json!({
            "type": "ADD_ELEMENT",
            "modelProps": { "path": path }
        }))));
    }
    let both = element_snapshot(&session);

    session.dispatch(DesignAction::Undo);
    let design = session.design();
    let remaining: Vec<_> = design.live_elements().collect();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].path(), "p1");
    assert_eq!(remaining[0].unique_id(), both[0].0);

    session.dispatch(DesignAction::Redo);
    assert_eq!(element_snapshot(&session), both);
    assert_eq!(session.current_index(), Some(1));
    assert_eq!(session.history_len(), 2);
}

#[test]
fn test_commit_count_matches_committing_actions() {
    let session = DesignSession::new();
    let messages = [
        json!({ "type": "SET_BASE_STYLE", "payload": "tiered", "modelProps": { "path": "models/tier.glb" } }),
        json!({ "type": "SET_CAKE_COLOR", "payload": "#f8c8dc" }),
        json!({ "type": "SET_FLAVOUR", "payload": { "name": "Vanilla" } }),
        json!({ "type": "SET_TOPPER", "payload": null }),
        json!({ "type": "SET_MESSAGE", "payload": "Congrats" }),
        json!({ "type": "SET_MESSAGE_FONT", "payload": "serif" }),
        json!({ "type": "SET_MESSAGE_SCALE", "payload": 0.3 }),
    ];
    for body in messages {
        assert!(session.dispatch_message(&message(body)));
    }

    assert_eq!(session.history_len(), 7);
    assert_eq!(session.current_index(), Some(6));

    let design = session.design();
    assert_eq!(design.base_style.as_deref(), Some("tiered"));
    assert_eq!(design.color, "#f8c8dc");
    assert_eq!(design.flavor.as_deref(), Some("Vanilla"));
    assert_eq!(design.message_scale, 0.3);
    assert_eq!(
        design.base_item.as_ref().map(|b| b.path().to_string()),
        Some("models/tier.glb".to_string())
    );
}

#[test]
fn test_non_committing_actions_leave_history() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetMessage("kept".into()));

    session.dispatch(DesignAction::SetLoading(true));
    session.dispatch(DesignAction::UpdatePlacement(Placement {
        top_y: 1.2,
        center_x: 0.0,
        center_z: 0.0,
        radius: 0.8,
    }));
    session.dispatch(DesignAction::Undo);
    session.dispatch(DesignAction::Redo);

    assert_eq!(session.history_len(), 1);
    assert!(session.is_loading());
    assert_eq!(session.design().placement.map(|p| p.radius), Some(0.8));
}

#[test]
fn test_placement_survives_undo() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetMessage("a".into()));
    session.dispatch(DesignAction::SetMessage("b".into()));
    let placement = Placement {
        top_y: 2.0,
        center_x: 0.1,
        center_z: -0.1,
        radius: 1.0,
    };
    session.dispatch(DesignAction::UpdatePlacement(placement));

    session.dispatch(DesignAction::Undo);

    let design = session.design();
    assert_eq!(design.message, "a");
    assert_eq!(design.placement, Some(placement));
}

#[test]
fn test_update_element_by_message() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::AddElement(
        ItemProps::new().with_path("models/star.glb"),
    ));
    let id = session.design().unique_ids()[0].to_string();

    assert!(session.dispatch_message(&message(json!({
        "type": "UPDATE_ELEMENT",
        "payload": { "uniqueId": id },
        "modelProps": { "position": [1.0, 2.0, 3.0], "color": "#00ff00", "scale": [2.0, 2.0, 2.0] }
    }))));

    let design = session.design();
    let star = design.element(&id).expect("element still present");
    assert_eq!(star.position(), [1.0, 2.0, 3.0]);
    assert_eq!(star.color().primary, "#00ff00");
    assert_eq!(star.scale(), [2.0, 2.0, 2.0]);
    assert_eq!(session.history_len(), 2);
}

#[test]
fn test_duplicate_and_paste_keep_ids_unique() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::AddElement(
        ItemProps::new().with_path("models/rose.glb"),
    ));
    let id = session.design().unique_ids()[0].to_string();

    session.dispatch(DesignAction::DuplicateElement {
        unique_id: id.clone(),
    });
    let clipboard = session.copy_elements(&[id.as_str()]);
    session.dispatch(DesignAction::PasteElements(clipboard.clone()));
    session.dispatch(DesignAction::PasteElements(clipboard));

    let design = session.design();
    let mut ids = design.unique_ids();
    assert_eq!(ids.len(), 4);
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(session.history_len(), 4);
}

#[test]
fn test_unknown_and_malformed_messages_are_ignored() {
    let session = DesignSession::new();

    assert!(!session.dispatch_message(&ActionMessage::new("SPIN")));
    assert!(!session.dispatch_message(
        &ActionMessage::new("SET_MESSAGE_POSITION").with_payload(json!([1.0, 2.0]))
    ));
    assert!(!session.dispatch_message(
        &ActionMessage::new("REMOVE_ELEMENT").with_payload(json!(42))
    ));

    assert_eq!(session.history_len(), 0);
}
