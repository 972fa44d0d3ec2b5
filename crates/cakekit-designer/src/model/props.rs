use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ColorSpec, Vec3};

/// Raw model properties carried by an action (`modelProps` on the wire).
///
/// Kept as a plain JSON object so that the registry setters decide what is
/// meaningful; builder methods cover the keys callers use in practice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemProps(Map<String, Value>);

impl ItemProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Only objects are properties.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn with_path(self, path: impl Into<String>) -> Self {
        self.with("path", path.into())
    }

    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with("name", name.into())
    }

    pub fn with_position(self, position: Vec3) -> Self {
        self.with("position", position.to_vec())
    }

    pub fn with_scale(self, scale: Vec3) -> Self {
        self.with("scale", scale.to_vec())
    }

    pub fn with_color(self, color: impl Into<String>) -> Self {
        self.with("color", color.into())
    }

    pub fn with_color_spec(self, color: &ColorSpec) -> Self {
        self.with("color", color.to_value())
    }

    pub fn with_regions<I, S>(self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let regions: Vec<Value> = regions
            .into_iter()
            .map(|r| Value::String(r.into()))
            .collect();
        self.with("targetedRegionNames", regions)
    }

    pub fn with_price(self, price: f64) -> Self {
        self.with("price", price)
    }

    pub fn with_texture(mut self, region: impl Into<String>, texture: impl Into<String>) -> Self {
        let entry = self
            .0
            .entry("textureMap")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(textures) = entry {
            textures.insert(region.into(), Value::String(texture.into()));
        }
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with("text", text.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn path(&self) -> Option<&str> {
        self.0.get("path").and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
