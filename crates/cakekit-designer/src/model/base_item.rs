use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    ColorSpec, ItemAttributes, ItemModel, ItemProps, SceneHandle, TextureMap, Vec3,
    DEFAULT_BASE_COLOR, DEFAULT_BASE_NAME,
};

/// Plain, persistable properties of a base item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseItemProperties {
    pub path: String,
    pub name: String,
    pub position: Vec3,
    pub color: ColorSpec,
    pub targeted_region_names: Vec<String>,
    pub price: f64,
    pub texture_map: TextureMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The primary customizable object of a design.
#[derive(Debug, Clone)]
pub struct BaseItemModel {
    attributes: ItemAttributes,
    scene: Option<SceneHandle>,
}

impl BaseItemModel {
    /// Create a base item for the asset at `path` with default fields.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            attributes: ItemAttributes::new(path.as_ref(), DEFAULT_BASE_NAME, DEFAULT_BASE_COLOR),
            scene: None,
        }
    }

    /// Build a base item from an action's model properties.
    pub fn from_props(props: &ItemProps) -> Self {
        let mut item = Self::new(props.path().unwrap_or_default());
        item.apply_props(props);
        item
    }

    /// Rebuild a live base item by replaying its setters.
    pub fn from_properties(properties: &BaseItemProperties) -> Self {
        let mut item = Self::new(&properties.path);
        item.set_name(properties.name.clone());
        item.set_position(properties.position);
        item.set_color(properties.color.clone());
        item.set_targeted_region_names(properties.targeted_region_names.iter().cloned());
        item.set_price(properties.price);
        item.set_textures(properties.texture_map.clone());
        item.set_text(properties.text.clone());
        item
    }

    /// Build a base item from a loosely-shaped JSON object, ignoring
    /// anything the registry does not understand.
    pub fn from_property_map(map: &Map<String, Value>) -> Self {
        let path = map.get("path").and_then(Value::as_str).unwrap_or_default();
        let mut item = Self::new(path);
        for (key, value) in map {
            item.apply_property(key, value);
        }
        item
    }

    pub fn get_properties(&self) -> BaseItemProperties {
        let a = &self.attributes;
        BaseItemProperties {
            path: a.path.clone(),
            name: a.name.clone(),
            position: a.position,
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

impl ItemModel for BaseItemModel {
    fn attributes(&self) -> &ItemAttributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut ItemAttributes {
        &mut self.attributes
    }
}
