//! Wire format of the remote design store.
//!
//! The remote store keeps designs in its own flat shape (`_id`,
//! `cakeModel`, `targetedMeshName` as a string or a list, ...). This module
//! is the only place that shape meets the live models: inbound records are
//! rebuilt through the registry setters, outbound records are produced from
//! the live design.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use cakekit_core::PersistenceError;

use crate::design::{
    Design, DesignElement, DEFAULT_DESIGN_COLOR, DEFAULT_MESSAGE_COLOR, DEFAULT_MESSAGE_FONT,
    DEFAULT_MESSAGE_POSITION, DEFAULT_MESSAGE_ROTATION, DEFAULT_MESSAGE_SCALE,
};
use crate::model::{
    price_from_value, regions_from_value, textures_from_value, vec3_from_value, BaseItemModel,
    ElementModel, ItemModel, TextureMap, Vec3,
};
use crate::snapshot::{field, read_field};

/// One item (base item or element) as the remote store keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalItem {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    /// Any accepted color shape; normalized by the registry on the way in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    pub targeted_mesh_name: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub textures: TextureMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
}

/// A design as the remote store keeps it.
///
/// Inbound records are read field by field with
/// [`ExternalDesignRecord::from_value`]: a missing, `null` or mis-typed
/// field keeps its default and a malformed element is dropped, so one bad
/// field never costs the whole design.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDesignRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    pub base_item: Option<ExternalItem>,
    pub elements: Vec<ExternalItem>,
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
    pub preview_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for ExternalDesignRecord {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            is_public: false,
            base_item: None,
            elements: Vec::new(),
            base_style: None,
            item_variant: None,
            color: DEFAULT_DESIGN_COLOR.to_string(),
            flavor: None,
            topper: None,
            message: String::new(),
            message_color: DEFAULT_MESSAGE_COLOR.to_string(),
            message_font: DEFAULT_MESSAGE_FONT.to_string(),
            message_position: DEFAULT_MESSAGE_POSITION,
            message_rotation: DEFAULT_MESSAGE_ROTATION,
            message_scale: DEFAULT_MESSAGE_SCALE,
            preview_image: None,
            created_at: None,
            saved_at: None,
        }
    }
}

/// Read a field through `parse`. Absent and `null` fields read as `None`;
/// a field `parse` rejects is logged and also reads as `None`.
fn parse_field<T>(
    map: &Map<String, Value>,
    keys: &[&str],
    parse: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = field(map, keys).filter(|v| !v.is_null())?;
    let parsed = parse(value);
    if parsed.is_none() {
        tracing::warn!(
            "Record field '{}' is malformed ({}); keeping default",
            keys[0],
            value
        );
    }
    parsed
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// A number, or a string holding one.
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ExternalItem {
    /// Read one stored item. Returns `None` when `value` is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            path: parse_field(map, &["path"], text).unwrap_or_default(),
            name: parse_field(map, &["name"], text),
            position: parse_field(map, &["position"], vec3_from_value),
            scale: parse_field(map, &["scale"], vec3_from_value),
            color: field(map, &["color"]).cloned(),
            targeted_mesh_name: parse_field(
                map,
                &["targetedMeshName", "targetedRegionNames"],
                regions_from_value,
            )
            .unwrap_or_default(),
            price: parse_field(map, &["price"], price_from_value),
            textures: parse_field(map, &["textures", "textureMap"], textures_from_value)
                .unwrap_or_default(),
            text: parse_field(map, &["text"], text),
            unique_id: parse_field(map, &["uniqueId"], text),
        })
    }

    fn apply_to<M: ItemModel>(&self, model: &mut M) {
        if let Some(name) = &self.name {
            model.set_name(name.clone());
        }
        if let Some(position) = self.position {
            model.set_position(position);
        }
        if let Some(color) = &self.color {
            model.apply_property("color", color);
        }
        if let Some(price) = self.price {
            model.set_price(price);
        }
        if !self.textures.is_empty() {
            model.set_textures(self.textures.clone());
        }
        if self.text.is_some() {
            model.set_text(self.text.clone());
        }
    }

    pub fn to_base_item(&self) -> BaseItemModel {
        let mut item = BaseItemModel::new(&self.path);
        self.apply_to(&mut item);
        item.set_targeted_region_names(self.targeted_mesh_name.iter().cloned());
        item
    }

    /// Rebuild a live element. A stored identity is kept; otherwise the
    /// element gets a fresh one.
    pub fn to_element(&self) -> ElementModel {
        let mut element = match self.unique_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => ElementModel::with_unique_id(&self.path, id),
            None => ElementModel::new(&self.path),
        };
        self.apply_to(&mut element);
        if !self.targeted_mesh_name.is_empty() {
            element.set_targeted_region_names(self.targeted_mesh_name.iter().cloned());
        }
        if let Some(scale) = self.scale {
            element.set_scale(scale);
        }
        element
    }

    fn from_model<M: ItemModel>(model: &M) -> Self {
        Self {
            path: model.path().to_string(),
            name: Some(model.name().to_string()),
            position: Some(model.position()),
            scale: None,
            color: Some(model.color().to_value()),
            targeted_mesh_name: model.targeted_region_names().to_vec(),
            price: Some(model.price()),
            textures: model.texture_map().clone(),
            text: model.text().map(str::to_string),
            unique_id: None,
        }
    }

    pub fn from_base_item(item: &BaseItemModel) -> Self {
        Self::from_model(item)
    }

    pub fn from_element(element: &ElementModel) -> Self {
        Self {
            scale: Some(element.scale()),
            unique_id: Some(element.unique_id().to_string()),
            ..Self::from_model(element)
        }
    }
}

impl ExternalDesignRecord {
    /// Parse a record body returned by the store.
    ///
    /// Fails only when the body is not a JSON object; anything wrong inside
    /// the object is repaired field by field.
    pub fn from_json(body: &str) -> Result<Self, PersistenceError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| PersistenceError::InvalidRecord {
                reason: e.to_string(),
            })?;
        Self::from_value(&value)
    }

    /// Leniently read a stored record.
    pub fn from_value(value: &Value) -> Result<Self, PersistenceError> {
        let map = value
            .as_object()
            .ok_or_else(|| PersistenceError::InvalidRecord {
                reason: format!("expected an object, got {}", value),
            })?;

        let mut record = Self::default();

        match field(map, &["baseItem", "cakeModel"]) {
            None | Some(Value::Null) => {}
            Some(item) => {
                record.base_item = ExternalItem::from_value(item);
                if record.base_item.is_none() {
                    tracing::warn!("Record base item is malformed: {}", item);
                }
            }
        }

        match field(map, &["elements"]) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                record.elements = items
                    .iter()
                    .filter_map(|item| {
                        let parsed = ExternalItem::from_value(item);
                        if parsed.is_none() {
                            tracing::warn!("Dropping malformed record element: {}", item);
                        }
                        parsed
                    })
                    .collect();
            }
            Some(other) => tracing::warn!("Record elements are malformed: {}", other),
        }

        read_field(map, &["_id"], &mut record.id);
        read_field(map, &["name"], &mut record.name);
        read_field(map, &["description"], &mut record.description);
        read_field(map, &["isPublic"], &mut record.is_public);
        read_field(map, &["baseStyle"], &mut record.base_style);
        read_field(map, &["itemVariant", "cakeType"], &mut record.item_variant);
        read_field(map, &["color", "cakeColor"], &mut record.color);
        read_field(map, &["flavor", "flavour"], &mut record.flavor);
        read_field(map, &["topper"], &mut record.topper);
        read_field(map, &["message"], &mut record.message);
        read_field(map, &["messageColor"], &mut record.message_color);
        read_field(map, &["messageFont"], &mut record.message_font);
        if let Some(position) = parse_field(map, &["messagePosition"], vec3_from_value) {
            record.message_position = position;
        }
        if let Some(rotation) = parse_field(map, &["messageRotation"], vec3_from_value) {
            record.message_rotation = rotation;
        }
        if let Some(scale) = parse_field(map, &["messageScale"], number) {
            record.message_scale = scale;
        }
        read_field(map, &["previewImage"], &mut record.preview_image);
        read_field(map, &["createdAt"], &mut record.created_at);
        read_field(map, &["savedAt"], &mut record.saved_at);

        Ok(record)
    }

    /// Rebuild a live design through the model registry.
    ///
    /// Duplicate element identities in the record are repaired.
    pub fn to_design(&self) -> Design {
        let mut design = Design {
            base_item: self.base_item.as_ref().map(ExternalItem::to_base_item),
            elements: self
                .elements
                .iter()
                .map(|item| DesignElement::Element(item.to_element()))
                .collect(),
            base_style: self.base_style.clone(),
            item_variant: self.item_variant.clone(),
            color: self.color.clone(),
            flavor: self.flavor.clone(),
            topper: self.topper.clone(),
            message: self.message.clone(),
            message_color: self.message_color.clone(),
            message_font: self.message_font.clone(),
            ..Design::default()
        };
        design.set_message_position(self.message_position);
        design.set_message_rotation(self.message_rotation);
        design.set_message_scale(self.message_scale);
        design.ensure_unique_ids();
        design
    }

    /// Outbound record for the live design. Unrecognized element records
    /// have no wire form and are left out.
    pub fn from_design(design: &Design) -> Self {
        Self {
            base_item: design.base_item.as_ref().map(ExternalItem::from_base_item),
            elements: design
                .live_elements()
                .map(ExternalItem::from_element)
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
            ..Self::default()
        }
    }

    pub fn with_details(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        is_public: bool,
    ) -> Self {
        self.name = name.into();
        self.description = description.into();
        self.is_public = is_public;
        self
    }
}
