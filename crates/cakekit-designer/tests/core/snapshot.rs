use cakekit_designer::{
    decode, encode, DesignAction, DesignSession, ItemModel, ItemProps, Placement, Snapshot,
};
use serde_json::json;

#[test]
fn test_message_survives_json_round_trip() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetMessage("Happy Birthday".into()));
    let before = session.design();

    let json = serde_json::to_string(&encode(&before)).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).unwrap();
    let after = decode(&parsed);

    assert_eq!(after.message, "Happy Birthday");
    assert_eq!(after.message_position, before.message_position);
}

#[test]
fn test_round_trip_preserves_element_order_and_identity() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetBaseStyle {
        style: Some("round".into()),
        props: Some(ItemProps::new().with_path("models/round.glb").with_price(30.0)),
    });
    for (path, color) in [("a.glb", "#111111"), ("b.glb", "#222222"), ("c.glb", "#333333")] {
        session.dispatch(DesignAction::AddElement(
            ItemProps::new().with_path(path).with_color(color),
        ));
    }

    let design = session.design();
    let rebuilt = decode(&encode(&design));

    let originals: Vec<_> = design
        .live_elements()
        .map(|e| (e.unique_id().to_string(), e.path().to_string(), e.get_properties()))
        .collect();
    let copies: Vec<_> = rebuilt
        .live_elements()
        .map(|e| (e.unique_id().to_string(), e.path().to_string(), e.get_properties()))
        .collect();
    assert_eq!(originals, copies);
    assert_eq!(
        rebuilt.base_item.map(|b| b.get_properties()),
        design.base_item.map(|b| b.get_properties())
    );
}

#[test]
fn test_placement_excluded_from_content_equality() {
    let session = DesignSession::new();
    session.dispatch(DesignAction::SetMessage("same".into()));
    let without = session.snapshot();

    session.dispatch(DesignAction::UpdatePlacement(Placement {
        top_y: 3.0,
        center_x: 0.0,
        center_z: 0.0,
        radius: 1.5,
    }));
    let with = session.snapshot();

    assert_ne!(without, with);
    assert!(without.content_eq(&with));
}

#[test]
fn test_lenient_snapshot_from_foreign_json() {
    let value = json!({
        "cakeModel": { "path": "models/square.glb", "color": "#abcdef" },
        "elements": [
            { "kind": "Element", "uniqueId": 7, "path": "models/bow.glb", "properties": { "name": "Bow" } },
            { "kind": "Sparkles", "uniqueId": "s1", "density": 0.4 },
            "not a record"
        ],
        "cakeColor": "#fafafa",
        "messageScale": "big",
        "message": "Hi"
    });

    let snapshot = Snapshot::from_json_value(&value);
    assert_eq!(snapshot.elements.len(), 2);
    assert_eq!(snapshot.elements[0].unique_id, "7");
    assert_eq!(snapshot.color, "#fafafa");
    assert_eq!(snapshot.message_scale, 0.15);

    let design = decode(&snapshot);
    assert_eq!(design.live_elements().count(), 1);
    assert_eq!(design.elements.len(), 2);
    assert_eq!(
        design.base_item.as_ref().map(|b| b.color().primary.as_str()),
        Some("#abcdef")
    );

    let reencoded = encode(&design);
    assert_eq!(reencoded.elements[1], snapshot.elements[1]);
}

#[test]
fn test_non_object_snapshot_is_empty_design() {
    let snapshot = Snapshot::from_json_value(&json!([1, 2, 3]));
    assert_eq!(snapshot, Snapshot::default());
}
