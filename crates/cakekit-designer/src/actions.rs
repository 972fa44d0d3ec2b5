//! Action vocabulary of the state transition function.
//!
//! [`DesignAction`] is the typed form; [`ActionMessage`] is the
//! `{ type, payload?, modelProps? }` wire form accepted from the UI layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::design::{Design, Placement};
use crate::model::{vec3_from_value, ElementModel, ItemProps, Vec3};
use crate::snapshot::ElementRecord;

/// One state transition.
#[derive(Debug, Clone)]
pub enum DesignAction {
    /// Pick a base style; `props` rebuilds the base item.
    SetBaseStyle {
        style: Option<String>,
        props: Option<ItemProps>,
    },
    /// Pick an item variant; `props` with a `path` rebuilds the base item.
    SetItemVariant {
        variant: Option<String>,
        props: Option<ItemProps>,
    },
    SetColor(String),
    SetFlavor(Option<String>),
    /// Add a new element. Any identity in the props is ignored.
    AddElement(ItemProps),
    RemoveElement {
        unique_id: String,
    },
    /// Edit a placed element (drag, rescale, recolor).
    UpdateElement {
        unique_id: String,
        props: ItemProps,
    },
    DuplicateElement {
        unique_id: String,
    },
    /// Paste clipboard records. Identities are kept unless they collide.
    PasteElements(Vec<ElementRecord>),
    SetTopper(Option<String>),
    SetMessage(String),
    SetMessageFont(String),
    SetMessageColor(String),
    SetMessagePosition(Vec3),
    SetMessageRotation(Vec3),
    SetMessageScale(f64),
    /// Empty design and empty history.
    Reset,
    Undo,
    Redo,
    /// Commit the live design unchanged.
    Checkpoint,
    SetLoading(bool),
    UpdatePlacement(Placement),
    /// Replace the element collection wholesale without committing.
    ReplaceElements(Vec<ElementModel>),
    /// Replace the whole live design without committing.
    InstallDesign(Box<Design>),
}

impl DesignAction {
    /// Wire name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            DesignAction::SetBaseStyle { .. } => "SET_BASE_STYLE",
            DesignAction::SetItemVariant { .. } => "SET_ITEM_VARIANT",
            DesignAction::SetColor(_) => "SET_COLOR",
            DesignAction::SetFlavor(_) => "SET_FLAVOR",
            DesignAction::AddElement(_) => "ADD_ELEMENT",
            DesignAction::RemoveElement { .. } => "REMOVE_ELEMENT",
            DesignAction::UpdateElement { .. } => "UPDATE_ELEMENT",
            DesignAction::DuplicateElement { .. } => "DUPLICATE_ELEMENT",
            DesignAction::PasteElements(_) => "PASTE_ELEMENTS",
            DesignAction::SetTopper(_) => "SET_TOPPER",
            DesignAction::SetMessage(_) => "SET_MESSAGE",
            DesignAction::SetMessageFont(_) => "SET_MESSAGE_FONT",
            DesignAction::SetMessageColor(_) => "SET_MESSAGE_COLOR",
            DesignAction::SetMessagePosition(_) => "SET_MESSAGE_POSITION",
            DesignAction::SetMessageRotation(_) => "SET_MESSAGE_ROTATION",
            DesignAction::SetMessageScale(_) => "SET_MESSAGE_SCALE",
            DesignAction::Reset => "RESET",
            DesignAction::Undo => "UNDO",
            DesignAction::Redo => "REDO",
            DesignAction::Checkpoint => "CHECKPOINT",
            DesignAction::SetLoading(_) => "SET_LOADING",
            DesignAction::UpdatePlacement(_) => "UPDATE_PLACEMENT",
            DesignAction::ReplaceElements(_) => "REPLACE_ELEMENTS",
            DesignAction::InstallDesign(_) => "INSTALL_DESIGN",
        }
    }

    /// Whether a successful application appends a history entry.
    pub fn is_committing(&self) -> bool {
        !matches!(
            self,
            DesignAction::Reset
                | DesignAction::Undo
                | DesignAction::Redo
                | DesignAction::SetLoading(_)
                | DesignAction::UpdatePlacement(_)
                | DesignAction::ReplaceElements(_)
                | DesignAction::InstallDesign(_)
        )
    }

    /// Translate a wire message into a typed action.
    ///
    /// Returns `None` for an unknown `type` or an unusable payload, so that
    /// dispatching it is a no-op.
    pub fn from_message(message: &ActionMessage) -> Option<Self> {
        let action = Self::parse(message);
        if action.is_none() {
            tracing::debug!(
                "Ignoring action '{}' with payload {:?}",
                message.kind,
                message.payload
            );
        }
        action
    }

    fn parse(message: &ActionMessage) -> Option<Self> {
        let payload = message.payload.as_ref();
        let model_props = || message.model_props.clone().and_then(ItemProps::from_value);

        let action = match message.kind.as_str() {
            "SET_BASE_STYLE" => DesignAction::SetBaseStyle {
                style: optional_label(payload)?,
                props: model_props(),
            },
            "SET_ITEM_VARIANT" | "SET_CAKE_TYPE" => DesignAction::SetItemVariant {
                variant: optional_label(payload)?,
                props: model_props(),
            },
            "SET_COLOR" | "SET_CAKE_COLOR" => DesignAction::SetColor(text(payload)?),
            "SET_FLAVOR" | "SET_FLAVOUR" => DesignAction::SetFlavor(optional_label(payload)?),
            "ADD_ELEMENT" => DesignAction::AddElement(
                model_props().or_else(|| payload.cloned().and_then(ItemProps::from_value))?,
            ),
            "REMOVE_ELEMENT" => DesignAction::RemoveElement {
                unique_id: element_id(payload)?,
            },
            "UPDATE_ELEMENT" => DesignAction::UpdateElement {
                unique_id: element_id(payload)?,
                props: model_props()?,
            },
            "DUPLICATE_ELEMENT" => DesignAction::DuplicateElement {
                unique_id: element_id(payload)?,
            },
            "PASTE_ELEMENTS" => DesignAction::PasteElements(records(payload)?),
            "SET_TOPPER" => DesignAction::SetTopper(optional_label(payload)?),
            "SET_MESSAGE" => DesignAction::SetMessage(match payload {
                None | Some(Value::Null) => String::new(),
                other => text(other)?,
            }),
            "SET_MESSAGE_FONT" => DesignAction::SetMessageFont(text(payload)?),
            "SET_MESSAGE_COLOR" => DesignAction::SetMessageColor(text(payload)?),
            "SET_MESSAGE_POSITION" => {
                DesignAction::SetMessagePosition(vec3_from_value(payload?)?)
            }
            "SET_MESSAGE_ROTATION" => {
                DesignAction::SetMessageRotation(vec3_from_value(payload?)?)
            }
            "SET_MESSAGE_SCALE" => DesignAction::SetMessageScale(payload?.as_f64()?),
            "RESET" => DesignAction::Reset,
            "UNDO" => DesignAction::Undo,
            "REDO" => DesignAction::Redo,
            "CHECKPOINT" => DesignAction::Checkpoint,
            "SET_LOADING" => DesignAction::SetLoading(payload?.as_bool()?),
            "UPDATE_PLACEMENT" | "UPDATE_CAKE_PLACEMENT" => {
                DesignAction::UpdatePlacement(Placement::deserialize(payload?).ok()?)
            }
            "REPLACE_ELEMENTS" => DesignAction::ReplaceElements(
                records(payload)?
                    .iter()
                    .filter(|r| r.is_element())
                    .map(ElementRecord::to_model)
                    .collect(),
            ),
            _ => return None,
        };
        Some(action)
    }
}

/// Wire form of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(
        default,
        alias = "cakeModelProps",
        skip_serializing_if = "Option::is_none"
    )]
    pub model_props: Option<Value>,
}

impl ActionMessage {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: None,
            model_props: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_model_props(mut self, props: impl Into<Value>) -> Self {
        self.model_props = Some(props.into());
        self
    }
}

fn text(payload: Option<&Value>) -> Option<String> {
    payload?.as_str().map(str::to_string)
}

/// A label that may be cleared: a string, `null`/absent, or an object
/// carrying a `name` or `id`.
fn optional_label(payload: Option<&Value>) -> Option<Option<String>> {
    match payload {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(label)) => Some(Some(label.clone())),
        Some(Value::Object(map)) => map
            .get("name")
            .or_else(|| map.get("id"))
            .and_then(Value::as_str)
            .map(|label| Some(label.to_string())),
        Some(_) => None,
    }
}

/// An element identity: a bare id string or an object with `uniqueId`.
fn element_id(payload: Option<&Value>) -> Option<String> {
    match payload? {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => map
            .get("uniqueId")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn records(payload: Option<&Value>) -> Option<Vec<ElementRecord>> {
    let items = payload?.as_array()?;
    Some(items.iter().filter_map(ElementRecord::from_value).collect())
}
