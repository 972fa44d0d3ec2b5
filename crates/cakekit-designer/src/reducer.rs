//! State transition function.
//!
//! [`reduce`] maps a state and an action to the next state by value. Each
//! committing action ends in [`commit`], which snapshots the live design
//! into the history buffer. Undo and redo rebuild the live design from the
//! snapshot the buffer returns.

use crate::actions::DesignAction;
use crate::design::{Design, DesignElement, Placement};
use crate::history::HistoryBuffer;
use crate::model::{BaseItemModel, ElementModel, ItemModel, ItemProps};
use crate::snapshot::{decode, encode, ElementRecord};

/// Live design plus its history and transient flags.
#[derive(Debug, Clone, Default)]
pub struct DesignState {
    pub design: Design,
    pub history: HistoryBuffer,
    pub loading: bool,
}

impl DesignState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
}

/// Compute the state that follows `action`.
pub fn reduce(state: DesignState, action: DesignAction) -> DesignState {
    match action {
        DesignAction::SetBaseStyle { style, props } => set_base_style(state, style, props),
        DesignAction::SetItemVariant { variant, props } => set_item_variant(state, variant, props),
        DesignAction::SetColor(color) => edit(state, |d| d.color = color),
        DesignAction::SetFlavor(flavor) => edit(state, |d| d.flavor = flavor),
        DesignAction::AddElement(props) => add_element(state, &props),
        DesignAction::RemoveElement { unique_id } => remove_element(state, &unique_id),
        DesignAction::UpdateElement { unique_id, props } => {
            update_element(state, &unique_id, &props)
        }
        DesignAction::DuplicateElement { unique_id } => duplicate_element(state, &unique_id),
        DesignAction::PasteElements(records) => paste_elements(state, records),
        DesignAction::SetTopper(topper) => edit(state, |d| d.topper = topper),
        DesignAction::SetMessage(message) => edit(state, |d| d.message = message),
        DesignAction::SetMessageFont(font) => edit(state, |d| d.message_font = font),
        DesignAction::SetMessageColor(color) => edit(state, |d| d.message_color = color),
        DesignAction::SetMessagePosition(position) => {
            edit(state, |d| d.set_message_position(position))
        }
        DesignAction::SetMessageRotation(rotation) => {
            edit(state, |d| d.set_message_rotation(rotation))
        }
        DesignAction::SetMessageScale(scale) => edit(state, |d| d.set_message_scale(scale)),
        DesignAction::Reset => reset(state),
        DesignAction::Undo => undo(state),
        DesignAction::Redo => redo(state),
        DesignAction::Checkpoint => commit(state),
        DesignAction::SetLoading(loading) => DesignState { loading, ..state },
        DesignAction::UpdatePlacement(placement) => update_placement(state, placement),
        DesignAction::ReplaceElements(elements) => replace_elements(state, elements),
        DesignAction::InstallDesign(design) => install_design(state, *design),
    }
}

/// Snapshot the live design into history.
fn commit(mut state: DesignState) -> DesignState {
    let snapshot = encode(&state.design);
    state.history.commit(snapshot);
    state
}

/// Apply an edit to the live design and commit it.
fn edit(mut state: DesignState, apply: impl FnOnce(&mut Design)) -> DesignState {
    apply(&mut state.design);
    commit(state)
}

fn build_base_item(props: &ItemProps, message: &str) -> BaseItemModel {
    let mut item = BaseItemModel::from_props(props);
    if item.text().is_none() && !message.is_empty() {
        item.set_text(Some(message.to_string()));
    }
    item
}

fn set_base_style(
    state: DesignState,
    style: Option<String>,
    props: Option<ItemProps>,
) -> DesignState {
    edit(state, |d| {
        d.base_style = style;
        if let Some(props) = props {
            d.base_item = Some(build_base_item(&props, &d.message));
        }
    })
}

fn set_item_variant(
    state: DesignState,
    variant: Option<String>,
    props: Option<ItemProps>,
) -> DesignState {
    edit(state, |d| {
        d.item_variant = variant;
        if let Some(props) = props.filter(|p| p.path().is_some_and(|path| !path.is_empty())) {
            d.base_item = Some(build_base_item(&props, &d.message));
        }
    })
}

fn add_element(state: DesignState, props: &ItemProps) -> DesignState {
    let element = ElementModel::from_props(props);
    tracing::debug!(
        "Adding element {} ({})",
        element.unique_id(),
        element.path()
    );
    edit(state, |d| d.elements.push(element.into()))
}

fn remove_element(mut state: DesignState, unique_id: &str) -> DesignState {
    match state.design.position_of(unique_id) {
        Some(index) => {
            state.design.elements.remove(index);
            commit(state)
        }
        None => {
            tracing::debug!("Remove ignored: no element '{}'", unique_id);
            state
        }
    }
}

fn update_element(mut state: DesignState, unique_id: &str, props: &ItemProps) -> DesignState {
    match state.design.element_mut(unique_id) {
        Some(element) => {
            element.apply_props(props);
            commit(state)
        }
        None => {
            tracing::debug!("Update ignored: no element '{}'", unique_id);
            state
        }
    }
}

fn duplicate_element(state: DesignState, unique_id: &str) -> DesignState {
    match state.design.element(unique_id).map(ElementModel::duplicate) {
        Some(copy) => edit(state, |d| d.elements.push(copy.into())),
        None => {
            tracing::debug!("Duplicate ignored: no element '{}'", unique_id);
            state
        }
    }
}

fn paste_elements(mut state: DesignState, records: Vec<ElementRecord>) -> DesignState {
    if records.is_empty() {
        return state;
    }
    for record in records {
        let element = if record.is_element() {
            DesignElement::Element(record.to_model())
        } else {
            DesignElement::Unrecognized(record)
        };
        state.design.elements.push(element);
    }
    state.design.ensure_unique_ids();
    commit(state)
}

fn reset(state: DesignState) -> DesignState {
    let mut history = state.history;
    history.reset();
    DesignState {
        design: Design::default(),
        history,
        loading: state.loading,
    }
}

fn undo(mut state: DesignState) -> DesignState {
    if let Some(mut design) = state.history.undo().map(decode) {
        design.placement = state.design.placement;
        state.design = design;
    }
    state
}

fn redo(mut state: DesignState) -> DesignState {
    if let Some(mut design) = state.history.redo().map(decode) {
        design.placement = state.design.placement;
        state.design = design;
    }
    state
}

fn update_placement(mut state: DesignState, placement: Placement) -> DesignState {
    if placement.is_finite() {
        state.design.placement = Some(placement);
    } else {
        tracing::warn!("Ignoring non-finite placement {:?}", placement);
    }
    state
}

fn replace_elements(mut state: DesignState, elements: Vec<ElementModel>) -> DesignState {
    state.design.elements = elements.into_iter().map(DesignElement::Element).collect();
    state.design.ensure_unique_ids();
    state
}

fn install_design(mut state: DesignState, mut design: Design) -> DesignState {
    design.ensure_unique_ids();
    if design.placement.is_none() {
        design.placement = state.design.placement;
    }
    state.design = design;
    state
}
