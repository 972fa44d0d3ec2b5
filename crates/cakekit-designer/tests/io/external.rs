use cakekit_designer::{ExternalDesignRecord, ItemModel};

const LEGACY_RECORD: &str = r##"{
    "_id": "abc123",
    "name": "Wedding",
    "description": "Three tiers",
    "isPublic": false,
    "cakeModel": {
        "path": "models/tier3.glb",
        "color": "#fffaf0",
        "targetedMeshName": "frosting",
        "textures": { "frosting": "textures/lace.png" }
    },
    "cakeType": "tiered",
    "cakeColor": "#fffaf0",
    "flavour": "Lemon",
    "elements": [
        { "path": "models/pearl.glb", "uniqueId": "p1", "position": [0.1, 1.0, 0.2], "color": { "primary": "#eeeeee" } },
        { "path": "models/pearl.glb", "uniqueId": "p1", "price": 2.5 }
    ],
    "messageFont": "serif"
}"##;

#[test]
fn test_legacy_record_builds_live_design() {
    let record = ExternalDesignRecord::from_json(LEGACY_RECORD).unwrap();
    let design = record.to_design();

    assert_eq!(design.item_variant.as_deref(), Some("tiered"));
    assert_eq!(design.flavor.as_deref(), Some("Lemon"));
    assert_eq!(design.message_font, "serif");
    assert_eq!(design.message, "");

    let base = design.base_item.as_ref().unwrap();
    assert_eq!(base.targeted_region_names(), &["frosting".to_string()]);
    assert_eq!(base.texture("frosting"), Some("textures/lace.png"));

    let pearls: Vec<_> = design.live_elements().collect();
    assert_eq!(pearls[0].unique_id(), "p1");
    assert_eq!(pearls[0].position(), [0.1, 1.0, 0.2]);
    assert_ne!(pearls[1].unique_id(), "p1");
    assert_eq!(pearls[1].price(), 2.5);
}

#[test]
fn test_missing_fields_take_defaults() {
    let design = ExternalDesignRecord::from_json("{}").unwrap().to_design();
    assert!(design.base_item.is_none());
    assert!(design.elements.is_empty());
    assert_eq!(design.color, "#FFFFFF");
    assert_eq!(design.message_scale, 0.15);
}

#[test]
fn test_outbound_record_uses_current_field_names() {
    let design = ExternalDesignRecord::from_json(LEGACY_RECORD).unwrap().to_design();
    let value = serde_json::to_value(ExternalDesignRecord::from_design(&design)).unwrap();

    assert!(value.get("baseItem").is_some());
    assert!(value.get("cakeModel").is_none());
    assert_eq!(value["itemVariant"], "tiered");
    assert_eq!(value["elements"][0]["targetedMeshName"][0], "default");
    assert!(value.get("_id").is_none());
}
