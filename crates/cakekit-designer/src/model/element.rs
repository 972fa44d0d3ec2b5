use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    sanitize_vec3, vec3_from_value, ColorSpec, ItemAttributes, ItemModel, ItemProps, SceneHandle,
    TextureMap, Vec3, DEFAULT_ELEMENT_COLOR, DEFAULT_ELEMENT_NAME, DEFAULT_ELEMENT_REGION,
};

const DEFAULT_SCALE: Vec3 = [1.0, 1.0, 1.0];

/// Plain, persistable properties of an element.
///
/// Identity (`uniqueId`) and the asset path travel beside these on the
/// element record, not inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    pub name: String,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: ColorSpec,
    pub targeted_region_names: Vec<String>,
    pub price: f64,
    pub texture_map: TextureMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A decorative element attached to the base item.
#[derive(Debug, Clone)]
pub struct ElementModel {
    unique_id: String,
    attributes: ItemAttributes,
    scale: Vec3,
    scene: Option<SceneHandle>,
}

pub(crate) fn fresh_unique_id() -> String {
    Uuid::new_v4().to_string()
}

impl ElementModel {
    /// Create an element with a fresh identity and default fields.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self::with_unique_id(path, fresh_unique_id())
    }

    /// Create an element that keeps an existing identity.
    pub fn with_unique_id(path: impl AsRef<str>, unique_id: impl Into<String>) -> Self {
        let mut attributes =
            ItemAttributes::new(path.as_ref(), DEFAULT_ELEMENT_NAME, DEFAULT_ELEMENT_COLOR);
        attributes.targeted_region_names = vec![DEFAULT_ELEMENT_REGION.to_string()];
        Self {
            unique_id: unique_id.into(),
            attributes,
            scale: DEFAULT_SCALE,
            scene: None,
        }
    }

    /// Build a new element from an action's model properties.
    ///
    /// Any identity in `props` is ignored. Without a `name`, a catalog `id`
    /// is used as the display name.
    pub fn from_props(props: &ItemProps) -> Self {
        let mut element = Self::new(props.path().unwrap_or_default());
        if props.name().is_none() {
            if let Some(id) = props.get("id").and_then(Value::as_str) {
                element.set_name(id);
            }
        }
        element.apply_props(props);
        element
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = sanitize_vec3(scale, DEFAULT_SCALE);
    }

    /// Give this element a new identity and return it.
    pub(crate) fn reassign_unique_id(&mut self) -> &str {
        self.unique_id = fresh_unique_id();
        &self.unique_id
    }

    /// Copy this element under a fresh identity, without its scene handle.
    pub fn duplicate(&self) -> Self {
        Self {
            unique_id: fresh_unique_id(),
            attributes: self.attributes.clone(),
            scale: self.scale,
            scene: None,
        }
    }

    pub fn get_properties(&self) -> ElementProperties {
        let a = &self.attributes;
        ElementProperties {
            name: a.name.clone(),
            position: a.position,
            scale: self.scale,
            color: a.color.clone(),
            targeted_region_names: a.targeted_region_names.clone(),
            price: a.price,
            texture_map: a.texture_map.clone(),
            text: a.text.clone(),
        }
    }

    pub fn to_property_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self.get_properties()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn scene(&self) -> Option<SceneHandle> {
        self.scene
    }

    pub fn attach_scene(&mut self, handle: SceneHandle) {
        self.scene = Some(handle);
    }

    pub fn detach_scene(&mut self) -> Option<SceneHandle> {
        self.scene.take()
    }
}

impl ItemModel for ElementModel {
    fn attributes(&self) -> &ItemAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut ItemAttributes {
        &mut self.attributes
    }

    fn apply_property(&mut self, key: &str, value: &Value) {
        let applied = match key {
            "scale" => vec3_from_value(value)
                .map(|s| self.set_scale(s))
                .is_some(),
            _ => self.attributes.apply(key, value),
        };
        if !applied {
            tracing::trace!(
                "Ignoring property '{}' = {} on element {}",
                key,
                value,
                self.unique_id
            );
        }
    }
}
