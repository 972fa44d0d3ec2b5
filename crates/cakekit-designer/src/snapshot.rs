//! Snapshot codec.
//!
//! Converts a live [`Design`] into a plain [`Snapshot`] that survives a JSON
//! round trip, and rebuilds live models from one. Element records keep
//! their identity verbatim in both directions. Records of an unknown
//! `kind` are carried through unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::design::{Design, DesignElement, Placement};
use crate::model::{BaseItemModel, BaseItemProperties, ElementModel, ItemModel, Vec3};

/// Tag of element records produced by this codec.
pub const ELEMENT_KIND: &str = "Element";
const LEGACY_ELEMENT_KIND: &str = "ElementModel";

/// Plain, tagged form of one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    #[serde(alias = "type")]
    pub kind: String,
    pub unique_id: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Fields this codec does not know about, kept for pass-through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementRecord {
    pub fn from_model(element: &ElementModel) -> Self {
        Self {
            kind: ELEMENT_KIND.to_string(),
            unique_id: element.unique_id().to_string(),
            path: element.path().to_string(),
            properties: element.to_property_map(),
            extra: Map::new(),
        }
    }

    /// Whether this record describes a live element.
    pub fn is_element(&self) -> bool {
        self.kind == ELEMENT_KIND || self.kind == LEGACY_ELEMENT_KIND
    }

    /// Rebuild the live element, keeping the record's identity.
    pub fn to_model(&self) -> ElementModel {
        let mut element = ElementModel::with_unique_id(&self.path, self.unique_id.clone());
        for (key, value) in &self.properties {
            element.apply_property(key, value);
        }
        element
    }

    /// Leniently read a record from arbitrary JSON.
    ///
    /// Missing fields are defaulted; a record without an id gets a fresh
    /// one. Returns `None` only for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;

        let kind = map
            .get("kind")
            .or_else(|| map.get("type"))
            .and_then(Value::as_str)
            .unwrap_or(ELEMENT_KIND)
            .to_string();

        let unique_id = match map.get("uniqueId") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                let id = crate::model::fresh_unique_id();
                tracing::warn!("Element record without an id; assigned '{}'", id);
                id
            }
        };

        let path = map
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let properties = match map.get("properties") {
            Some(Value::Object(properties)) => properties.clone(),
            Some(other) => {
                tracing::warn!(
                    "Element record '{}' has malformed properties: {}",
                    unique_id,
                    other
                );
                Map::new()
            }
            None => Map::new(),
        };

        let extra = map
            .iter()
            .filter(|(key, _)| {
                !matches!(
                    key.as_str(),
                    "kind" | "type" | "uniqueId" | "path" | "properties"
                )
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            kind,
            unique_id,
            path,
            properties,
            extra,
        })
    }
}

/// Plain, deeply-copyable record form of a [`Design`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_item: Option<BaseItemProperties>,
    pub elements: Vec<ElementRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_variant: Option<String>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topper: Option<String>,
    pub message: String,
    pub message_color: String,
    pub message_font: String,
    pub message_position: Vec3,
    pub message_rotation: Vec3,
    pub message_scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl Default for Snapshot {
    fn default() -> Self {
        encode(&Design::default())
    }
}

impl Snapshot {
    /// Equality of everything except derived placement data.
    pub fn content_eq(&self, other: &Snapshot) -> bool {
        let strip = |s: &Snapshot| Snapshot {
            placement: None,
            ..s.clone()
        };
        strip(self) == strip(other)
    }

    /// Whether every number in the snapshot is representable in JSON.
    pub fn is_json_safe(&self) -> bool {
        let finite = |v: &[f64]| v.iter().all(|x| x.is_finite());

        let base_ok = self.base_item.as_ref().is_none_or(|b| {
            finite(&b.position) && b.price.is_finite()
        });

        base_ok
            && finite(&self.message_position)
            && finite(&self.message_rotation)
            && self.message_scale.is_finite()
            && self.placement.is_none_or(|p| p.is_finite())
    }

    /// Leniently read a snapshot from arbitrary JSON.
    ///
    /// Each top-level field is read on its own; a malformed or missing
    /// field keeps its default instead of failing the whole snapshot.
    pub fn from_json_value(value: &Value) -> Snapshot {
        let mut snapshot = Snapshot::default();

        let Some(map) = value.as_object() else {
            tracing::warn!("Snapshot is not an object; using an empty design");
            return snapshot;
        };

        match field(map, &["baseItem", "cakeModel"]) {
            None | Some(Value::Null) => {}
            Some(Value::Object(item)) => {
                snapshot.base_item = Some(BaseItemModel::from_property_map(item).get_properties());
            }
            Some(other) => tracing::warn!("Snapshot baseItem is malformed: {}", other),
        }

        match field(map, &["elements"]) {
            None => {}
            Some(Value::Array(items)) => {
                snapshot.elements = items
                    .iter()
                    .filter_map(|item| {
                        let record = ElementRecord::from_value(item);
                        if record.is_none() {
                            tracing::warn!("Dropping malformed element record: {}", item);
                        }
                        record
                    })
                    .collect();
            }
            Some(other) => tracing::warn!("Snapshot elements are malformed: {}", other),
        }

        read_field(map, &["baseStyle"], &mut snapshot.base_style);
        read_field(map, &["itemVariant", "cakeType"], &mut snapshot.item_variant);
        read_field(map, &["color", "cakeColor"], &mut snapshot.color);
        read_field(map, &["flavor", "flavour"], &mut snapshot.flavor);
        read_field(map, &["topper"], &mut snapshot.topper);
        read_field(map, &["message"], &mut snapshot.message);
        read_field(map, &["messageColor"], &mut snapshot.message_color);
        read_field(map, &["messageFont"], &mut snapshot.message_font);
        read_field(map, &["messagePosition"], &mut snapshot.message_position);
        read_field(map, &["messageRotation"], &mut snapshot.message_rotation);
        read_field(map, &["messageScale"], &mut snapshot.message_scale);
        read_field(map, &["placement", "cakePlacement"], &mut snapshot.placement);

        snapshot
    }
}

/// First present key among `keys`, current name first, then legacy aliases.
pub(crate) fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

/// Overwrite `slot` with the field when it parses; otherwise warn and keep
/// what is there.
pub(crate) fn read_field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    keys: &[&str],
    slot: &mut T,
) {
    let Some(value) = field(map, keys) else {
        return;
    };
    match T::deserialize(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => tracing::warn!(
            "Field '{}' is malformed ({}); keeping default",
            keys[0],
            e
        ),
    }
}

/// Capture a design as a plain snapshot.
pub fn encode(design: &Design) -> Snapshot {
    let snapshot = Snapshot {
        base_item: design.base_item.as_ref().map(BaseItemModel::get_properties),
        elements: design
            .elements
            .iter()
            .map(|element| match element {
                DesignElement::Element(model) => ElementRecord::from_model(model),
                DesignElement::Unrecognized(record) => record.clone(),
            })
            .collect(),
        base_style: design.base_style.clone(),
        item_variant: design.item_variant.clone(),
        color: design.color.clone(),
        flavor: design.flavor.clone(),
        topper: design.topper.clone(),
        message: design.message.clone(),
        message_color: design.message_color.clone(),
        message_font: design.message_font.clone(),
        message_position: design.message_position,
        message_rotation: design.message_rotation,
        message_scale: design.message_scale,
        placement: design.placement,
    };

    debug_assert!(
        snapshot.is_json_safe(),
        "snapshot holds numbers JSON cannot represent"
    );
    snapshot
}

/// Rebuild a live design from a snapshot.
pub fn decode(snapshot: &Snapshot) -> Design {
    let elements = snapshot
        .elements
        .iter()
        .map(|record| {
            if record.is_element() {
                DesignElement::Element(record.to_model())
            } else {
                tracing::debug!(
                    "Passing through element record of kind '{}'",
                    record.kind
                );
                DesignElement::Unrecognized(record.clone())
            }
        })
        .collect();

    let mut design = Design {
        base_item: snapshot
            .base_item
            .as_ref()
            .map(BaseItemModel::from_properties),
        elements,
        base_style: snapshot.base_style.clone(),
        item_variant: snapshot.item_variant.clone(),
        color: snapshot.color.clone(),
        flavor: snapshot.flavor.clone(),
        topper: snapshot.topper.clone(),
        message: snapshot.message.clone(),
        placement: snapshot.placement,
        ..Design::default()
    };
    design.message_color = snapshot.message_color.clone();
    design.message_font = snapshot.message_font.clone();
    design.set_message_position(snapshot.message_position);
    design.set_message_rotation(snapshot.message_rotation);
    design.set_message_scale(snapshot.message_scale);
    design
}

impl From<&Design> for Snapshot {
    fn from(design: &Design) -> Self {
        encode(design)
    }
}

impl From<&Snapshot> for Design {
    fn from(snapshot: &Snapshot) -> Self {
        decode(snapshot)
    }
}
