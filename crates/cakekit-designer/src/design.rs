//! The live design aggregate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::model::{sanitize_vec3, BaseItemModel, ElementModel, Vec3};
use crate::snapshot::ElementRecord;

pub const DEFAULT_DESIGN_COLOR: &str = "#FFFFFF";
pub const DEFAULT_MESSAGE_COLOR: &str = "#000000";
pub const DEFAULT_MESSAGE_FONT: &str = "script";
pub const DEFAULT_MESSAGE_POSITION: Vec3 = [0.0, 2.0, 0.0];
pub const DEFAULT_MESSAGE_ROTATION: Vec3 = [0.0, 0.0, 0.0];
pub const DEFAULT_MESSAGE_SCALE: f64 = 0.15;

/// Derived attachment geometry on top of the base item.
///
/// Recomputed by an external geometry probe and stored verbatim; never a
/// user edit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub top_y: f64,
    pub center_x: f64,
    pub center_z: f64,
    pub radius: f64,
}

impl Placement {
    pub fn is_finite(&self) -> bool {
        [self.top_y, self.center_x, self.center_z, self.radius]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// One entry of the element collection.
#[derive(Debug, Clone)]
pub enum DesignElement {
    /// A live element.
    Element(ElementModel),
    /// A record of an unknown kind, carried through untouched.
    Unrecognized(ElementRecord),
}

impl DesignElement {
    pub fn unique_id(&self) -> &str {
        match self {
            DesignElement::Element(element) => element.unique_id(),
            DesignElement::Unrecognized(record) => &record.unique_id,
        }
    }

    pub fn as_element(&self) -> Option<&ElementModel> {
        match self {
            DesignElement::Element(element) => Some(element),
            DesignElement::Unrecognized(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementModel> {
        match self {
            DesignElement::Element(element) => Some(element),
            DesignElement::Unrecognized(_) => None,
        }
    }

    fn reassign_unique_id(&mut self) -> String {
        match self {
            DesignElement::Element(element) => element.reassign_unique_id().to_string(),
            DesignElement::Unrecognized(record) => {
                record.unique_id = crate::model::fresh_unique_id();
                record.unique_id.clone()
            }
        }
    }
}

impl From<ElementModel> for DesignElement {
    fn from(element: ElementModel) -> Self {
        DesignElement::Element(element)
    }
}

/// Root aggregate for a composed product.
#[derive(Debug, Clone)]
pub struct Design {
    pub base_item: Option<BaseItemModel>,
    pub elements: Vec<DesignElement>,
    pub base_style: Option<String>,
    pub item_variant: Option<String>,
    pub color: String,
    pub flavor: Option<String>,
    pub topper: Option<String>,
    pub message: String,
    pub message_color: String,
    pub message_font: String,
    pub message_position: Vec3,
    pub message_rotation: Vec3,
    pub message_scale: f64,
    pub placement: Option<Placement>,
}

impl Default for Design {
    fn default() -> Self {
        Self {
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
            placement: None,
        }
    }
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live elements in order, skipping unrecognized records.
    pub fn live_elements(&self) -> impl Iterator<Item = &ElementModel> {
        self.elements.iter().filter_map(DesignElement::as_element)
    }

    pub fn element(&self, unique_id: &str) -> Option<&ElementModel> {
        self.live_elements().find(|e| e.unique_id() == unique_id)
    }

    pub fn element_mut(&mut self, unique_id: &str) -> Option<&mut ElementModel> {
        self.elements
            .iter_mut()
            .filter_map(DesignElement::as_element_mut)
            .find(|e| e.unique_id() == unique_id)
    }

    pub fn position_of(&self, unique_id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.unique_id() == unique_id)
    }

    pub fn contains(&self, unique_id: &str) -> bool {
        self.position_of(unique_id).is_some()
    }

    pub fn unique_ids(&self) -> Vec<&str> {
        self.elements.iter().map(DesignElement::unique_id).collect()
    }

    pub fn set_message_position(&mut self, position: Vec3) {
        self.message_position = sanitize_vec3(position, DEFAULT_MESSAGE_POSITION);
    }

    pub fn set_message_rotation(&mut self, rotation: Vec3) {
        self.message_rotation = sanitize_vec3(rotation, DEFAULT_MESSAGE_ROTATION);
    }

    pub fn set_message_scale(&mut self, scale: f64) {
        self.message_scale = if scale.is_finite() {
            scale
        } else {
            DEFAULT_MESSAGE_SCALE
        };
    }

    /// Re-assign a fresh identity to every element whose id is empty or
    /// already used earlier in the collection. Returns how many changed.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        let mut reassigned = 0;

        for element in &mut self.elements {
            let id = element.unique_id();
            if id.is_empty() || seen.contains(id) {
                let previous = id.to_string();
                let fresh = element.reassign_unique_id();
                tracing::warn!(
                    "Duplicate element id '{}' reassigned to '{}'",
                    previous,
                    fresh
                );
                seen.insert(fresh);
                reassigned += 1;
            } else {
                seen.insert(id.to_string());
            }
        }

        reassigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemModel;

    #[test]
    fn test_default_message_fields() {
        let design = Design::default();
        assert_eq!(design.message, "");
        assert_eq!(design.message_color, "#000000");
        assert_eq!(design.message_font, "script");
        assert_eq!(design.message_position, [0.0, 2.0, 0.0]);
        assert_eq!(design.message_scale, 0.15);
        assert!(design.placement.is_none());
    }

    #[test]
    fn test_element_lookup() {
        let mut design = Design::default();
        let rose = ElementModel::new("models/rose.glb");
        let id = rose.unique_id().to_string();
        design.elements.push(rose.into());

        assert!(design.contains(&id));
        assert_eq!(design.position_of(&id), Some(0));
        design
            .element_mut(&id)
            .expect("element present")
            .set_name("Rose");
        assert_eq!(design.element(&id).map(|e| e.name()), Some("Rose"));
        assert!(design.element("missing").is_none());
    }

    #[test]
    fn test_ensure_unique_ids_reassigns_duplicates() {
        let mut design = Design::default();
        design
            .elements
            .push(ElementModel::with_unique_id("a.glb", "dup").into());
        design
            .elements
            .push(ElementModel::with_unique_id("b.glb", "dup").into());
        design
            .elements
            .push(ElementModel::with_unique_id("c.glb", "").into());

        assert_eq!(design.ensure_unique_ids(), 2);

        let ids = design.unique_ids();
        assert_eq!(ids[0], "dup");
        assert_ne!(ids[1], "dup");
        assert!(!ids[2].is_empty());
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_message_setters_sanitize() {
        let mut design = Design::default();
        design.set_message_position([1.0, f64::NAN, 0.0]);
        assert_eq!(design.message_position, [1.0, 2.0, 0.0]);

        design.set_message_scale(f64::INFINITY);
        assert_eq!(design.message_scale, 0.15);
    }
}
