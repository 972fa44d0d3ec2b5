//! Domain model registry.
//!
//! Live value objects for the base item and the decorative elements of a
//! design. Every field is set through a normalizing setter; the registry is
//! permissive about the shape of its input (unknown keys and mis-shaped
//! values are ignored) but always canonical in what
//! [`get_properties`](BaseItemModel::get_properties) returns.
//!
//! Live models may carry a [`SceneHandle`] owned by the renderer. Handles
//! never appear in properties, snapshots, or wire records.

mod base_item;
mod element;
mod props;

pub use base_item::{BaseItemModel, BaseItemProperties};
pub(crate) use element::fresh_unique_id;
pub use element::{ElementModel, ElementProperties};
pub use props::ItemProps;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Three-component vector (position, rotation, scale).
pub type Vec3 = [f64; 3];

/// Region name → texture locator.
pub type TextureMap = BTreeMap<String, String>;

/// Primary color given to a base item when none is supplied.
pub const DEFAULT_BASE_COLOR: &str = "#ffffff";
/// Primary color given to an element when none is supplied.
pub const DEFAULT_ELEMENT_COLOR: &str = "#FFFFFF";
/// Name given to a base item when none is supplied.
pub const DEFAULT_BASE_NAME: &str = "Layer1";
/// Name given to an element when none is supplied.
pub const DEFAULT_ELEMENT_NAME: &str = "Element";
/// Region an element colors when none is supplied.
pub const DEFAULT_ELEMENT_REGION: &str = "default";

/// Opaque handle to the renderer's scene object for a live model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneHandle(pub u64);

/// Canonical color of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSpec {
    /// Style token, usually a hex color.
    pub primary: String,
    /// Flavor the color was picked from, if any.
    #[serde(default)]
    pub flavor_name: Option<String>,
}

impl ColorSpec {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            flavor_name: None,
        }
    }

    pub fn with_flavor(primary: impl Into<String>, flavor: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            flavor_name: Some(flavor.into()),
        }
    }

    /// Collapse any accepted color input into the canonical shape.
    ///
    /// A missing or empty primary falls back to `fallback`.
    pub fn normalize(input: ColorInput, fallback: &str) -> Self {
        let (primary, flavor_name) = match input {
            ColorInput::Token(token) => (Some(token), None),
            ColorInput::Direct {
                primary,
                flavor_name,
            } => (primary, flavor_name),
            ColorInput::Flavor { name, primary } => (primary, name),
        };

        Self {
            primary: primary
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            flavor_name: flavor_name.filter(|n| !n.is_empty()),
        }
    }

    /// Wire form `{ primary, flavorName }`.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "primary": self.primary,
            "flavorName": self.flavor_name,
        })
    }
}

/// Any color shape accepted by the model setters.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorInput {
    /// A bare style token such as `"#ff00aa"`.
    Token(String),
    /// A direct `{ primary, flavorName? }` object.
    Direct {
        primary: Option<String>,
        flavor_name: Option<String>,
    },
    /// A flavor object `{ name, colors: { primary } }`.
    Flavor {
        name: Option<String>,
        primary: Option<String>,
    },
}

impl ColorInput {
    /// Interpret a JSON value as a color input.
    ///
    /// `null` means "no color" and normalizes to the default. A renderer
    /// color `{ r, g, b }` with unit channels becomes a hex token. Numbers,
    /// booleans and arrays are not colors.
    pub fn from_value(value: &Value) -> Option<Self> {
        let text = |v: Option<&Value>| v.and_then(Value::as_str).map(str::to_string);

        match value {
            Value::Null => Some(ColorInput::Token(String::new())),
            Value::String(token) => Some(ColorInput::Token(token.clone())),
            Value::Object(map) => Some(match map.get("colors") {
                Some(colors) => ColorInput::Flavor {
                    name: text(map.get("name")),
                    primary: text(colors.get("primary")),
                },
                None if !map.contains_key("primary") && map.contains_key("r") => {
                    match rgb_token(map) {
                        Some(token) => ColorInput::Token(token),
                        None => {
                            tracing::warn!("Malformed rgb color {}; using the default", value);
                            ColorInput::Token(String::new())
                        }
                    }
                }
                None => ColorInput::Direct {
                    primary: text(map.get("primary")),
                    flavor_name: text(map.get("flavorName")),
                },
            }),
            _ => None,
        }
    }
}

/// `#rrggbb` for channels in `[0, 1]`; out-of-range channels are clamped.
fn rgb_token(map: &Map<String, Value>) -> Option<String> {
    let channel = |key: &str| -> Option<u8> {
        let unit = map.get(key)?.as_f64().filter(|c| c.is_finite())?;
        Some((unit.clamp(0.0, 1.0) * 255.0).round() as u8)
    };
    Some(format!(
        "#{:02x}{:02x}{:02x}",
        channel("r")?,
        channel("g")?,
        channel("b")?
    ))
}

impl From<&str> for ColorInput {
    fn from(token: &str) -> Self {
        ColorInput::Token(token.to_string())
    }
}

impl From<String> for ColorInput {
    fn from(token: String) -> Self {
        ColorInput::Token(token)
    }
}

impl From<ColorSpec> for ColorInput {
    fn from(spec: ColorSpec) -> Self {
        ColorInput::Direct {
            primary: Some(spec.primary),
            flavor_name: spec.flavor_name,
        }
    }
}

/// Fields shared by base items and elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAttributes {
    pub(crate) path: String,
    pub(crate) name: String,
    pub(crate) position: Vec3,
    pub(crate) color: ColorSpec,
    pub(crate) default_color: &'static str,
    pub(crate) targeted_region_names: Vec<String>,
    pub(crate) price: f64,
    pub(crate) texture_map: TextureMap,
    pub(crate) text: Option<String>,
}

impl ItemAttributes {
    pub(crate) fn new(path: &str, name: &str, default_color: &'static str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            position: [0.0; 3],
            color: ColorSpec::new(default_color),
            default_color,
            targeted_region_names: Vec::new(),
            price: 0.0,
            texture_map: TextureMap::new(),
            text: None,
        }
    }

    /// Apply one wire-named property. Returns false when the key is unknown
    /// or the value has the wrong shape.
    pub(crate) fn apply(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "name" => value
                .as_str()
                .map(|name| self.name = name.to_string())
                .is_some(),
            "path" => value
                .as_str()
                .map(|path| self.path = path.to_string())
                .is_some(),
            "position" => vec3_from_value(value)
                .map(|p| self.position = sanitize_vec3(p, [0.0; 3]))
                .is_some(),
            "color" => ColorInput::from_value(value)
                .map(|c| self.color = ColorSpec::normalize(c, self.default_color))
                .is_some(),
            "targetedRegionNames" | "targetedMeshName" => regions_from_value(value)
                .map(|names| self.targeted_region_names = dedup_regions(names))
                .is_some(),
            "price" => price_from_value(value)
                .map(|p| self.price = sanitize_price(p))
                .is_some(),
            "textureMap" | "textures" => textures_from_value(value)
                .map(|t| self.texture_map = t)
                .is_some(),
            "text" => match value {
                Value::Null => {
                    self.text = None;
                    true
                }
                Value::String(text) => {
                    self.text = Some(text.clone());
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// Accessors and setters common to every live model.
pub trait ItemModel {
    fn attributes(&self) -> &ItemAttributes;
    fn attributes_mut(&mut self) -> &mut ItemAttributes;

    /// Permissive setter by wire name. Unknown keys are a no-op.
    fn apply_property(&mut self, key: &str, value: &Value) {
        if !self.attributes_mut().apply(key, value) {
            tracing::trace!("Ignoring property '{}' = {}", key, value);
        }
    }

    /// Apply every entry of an action's `modelProps`.
    fn apply_props(&mut self, props: &ItemProps) {
        for (key, value) in props.iter() {
            self.apply_property(key, value);
        }
    }

    fn path(&self) -> &str {
        &self.attributes().path
    }

    fn name(&self) -> &str {
        &self.attributes().name
    }

    fn position(&self) -> Vec3 {
        self.attributes().position
    }

    fn color(&self) -> &ColorSpec {
        &self.attributes().color
    }

    fn targeted_region_names(&self) -> &[String] {
        &self.attributes().targeted_region_names
    }

    fn price(&self) -> f64 {
        self.attributes().price
    }

    fn texture_map(&self) -> &TextureMap {
        &self.attributes().texture_map
    }

    fn texture(&self, region: &str) -> Option<&str> {
        self.attributes().texture_map.get(region).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.attributes().text.as_deref()
    }

    fn set_path(&mut self, path: impl Into<String>) {
        self.attributes_mut().path = path.into();
    }

    fn set_name(&mut self, name: impl Into<String>) {
        self.attributes_mut().name = name.into();
    }

    fn set_position(&mut self, position: Vec3) {
        self.attributes_mut().position = sanitize_vec3(position, [0.0; 3]);
    }

    fn set_color(&mut self, color: impl Into<ColorInput>) {
        let attributes = self.attributes_mut();
        attributes.color = ColorSpec::normalize(color.into(), attributes.default_color);
    }

    fn set_targeted_region_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes_mut().targeted_region_names =
            dedup_regions(names.into_iter().map(Into::into));
    }

    fn set_price(&mut self, price: f64) {
        self.attributes_mut().price = sanitize_price(price);
    }

    fn set_texture(&mut self, region: impl Into<String>, texture: impl Into<String>) {
        self.attributes_mut()
            .texture_map
            .insert(region.into(), texture.into());
    }

    fn set_textures(&mut self, textures: TextureMap) {
        self.attributes_mut().texture_map = textures;
    }

    fn set_text(&mut self, text: Option<String>) {
        self.attributes_mut().text = text;
    }
}

pub(crate) fn vec3_from_value(value: &Value) -> Option<Vec3> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let mut out = [0.0; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64()?;
    }
    Some(out)
}

/// Replace non-finite components with the matching fallback component.
pub(crate) fn sanitize_vec3(value: Vec3, fallback: Vec3) -> Vec3 {
    std::array::from_fn(|i| {
        if value[i].is_finite() {
            value[i]
        } else {
            fallback[i]
        }
    })
}

pub(crate) fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

pub(crate) fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn regions_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::String(name) => Some(vec![name.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Ordered, duplicate-free region list. Empty names are dropped.
pub(crate) fn dedup_regions(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

pub(crate) fn textures_from_value(value: &Value) -> Option<TextureMap> {
    match value {
        Value::Null => Some(TextureMap::new()),
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(region, texture)| {
                    texture
                        .as_str()
                        .map(|texture| (region.clone(), texture.to_string()))
                })
                .collect(),
        ),
        _ => None,
    }
}
