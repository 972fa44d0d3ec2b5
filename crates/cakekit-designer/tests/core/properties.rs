//! Property-based laws of the state transition function.
//!
//! 1. N committing actions from a fresh state give N history entries and a
//!    cursor at N - 1.
//! 2. decode(encode(d)) preserves every element's properties, in order.
//! 3. Undo K times then redo K times restores the live design.
//! 4. No two elements ever share a uniqueId.

use std::collections::HashSet;

use cakekit_designer::{
    decode, encode, reduce, DesignAction, DesignState, ElementRecord, ItemModel, ItemProps,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Message(String),
    Color(u32),
    Scale(f64),
    Move(usize, [f64; 3]),
    Duplicate(usize),
    Remove(usize),
    Paste(usize),
}

const PATHS: [&str; 4] = ["models/rose.glb", "models/bow.glb", "models/star.glb", "models/pearl.glb"];

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..PATHS.len()).prop_map(Op::Add),
        1 => "[a-zA-Z ]{0,12}".prop_map(Op::Message),
        1 => (0u32..0xffffff).prop_map(Op::Color),
        1 => (0.01f64..2.0).prop_map(Op::Scale),
        2 => (any::<usize>(), prop::array::uniform3(-5.0f64..5.0)).prop_map(|(i, p)| Op::Move(i, p)),
        1 => any::<usize>().prop_map(Op::Duplicate),
        1 => any::<usize>().prop_map(Op::Remove),
        1 => any::<usize>().prop_map(Op::Paste),
    ]
}

/// Turn an op into an action that is guaranteed to commit, or `None` when
/// it needs an element and the design has none.
fn to_action(state: &DesignState, op: &Op) -> Option<DesignAction> {
    let ids = state.design.unique_ids();
    let pick = |i: &usize| -> Option<String> {
        (!ids.is_empty()).then(|| ids[i % ids.len()].to_string())
    };

    Some(match op {
        Op::Add(i) => DesignAction::AddElement(ItemProps::new().with_path(PATHS[*i])),
        Op::Message(m) => DesignAction::SetMessage(m.clone()),
        Op::Color(c) => DesignAction::SetColor(format!("#{c:06x}")),
        Op::Scale(s) => DesignAction::SetMessageScale(*s),
        Op::Move(i, p) => DesignAction::UpdateElement {
            unique_id: pick(i)?,
            props: ItemProps::new().with_position(*p),
        },
        Op::Duplicate(i) => DesignAction::DuplicateElement { unique_id: pick(i)? },
        Op::Remove(i) => DesignAction::RemoveElement { unique_id: pick(i)? },
        Op::Paste(i) => {
            let id = pick(i)?;
            let element = state.design.element(&id)?;
            DesignAction::PasteElements(vec![ElementRecord::from_model(element)])
        }
    })
}

fn run(ops: &[Op]) -> (DesignState, usize) {
    let mut state = DesignState::new();
    let mut commits = 0;
    for op in ops {
        if let Some(action) = to_action(&state, op) {
            state = reduce(state, action);
            commits += 1;
        }
    }
    (state, commits)
}

proptest! {
    #[test]
    fn commit_count_matches_actions(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (state, commits) = run(&ops);
        prop_assert_eq!(state.history.len(), commits);
        prop_assert_eq!(state.history.current_index_signed(), commits as i64 - 1);
    }

    #[test]
    fn round_trip_preserves_elements(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (state, _) = run(&ops);
        let rebuilt = decode(&encode(&state.design));

        let before: Vec<_> = state.design.live_elements()
            .map(|e| (e.unique_id().to_string(), e.path().to_string(), e.get_properties()))
            .collect();
        let after: Vec<_> = rebuilt.live_elements()
            .map(|e| (e.unique_id().to_string(), e.path().to_string(), e.get_properties()))
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn undo_redo_are_inverse(
        ops in prop::collection::vec(op_strategy(), 1..30),
        k in 0usize..30,
    ) {
        let (mut state, _) = run(&ops);
        let Some(cursor) = state.history.current_index() else {
            return Ok(());
        };
        let k = k.min(cursor);
        let before = encode(&state.design);

        for _ in 0..k {
            state = reduce(state, DesignAction::Undo);
        }
        for _ in 0..k {
            state = reduce(state, DesignAction::Redo);
        }

        prop_assert_eq!(encode(&state.design), before);
        prop_assert_eq!(state.history.current_index(), Some(cursor));
    }

    #[test]
    fn unique_ids_hold(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let (state, _) = run(&ops);
        let ids = state.design.unique_ids();
        let distinct: HashSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(distinct.len(), ids.len());
    }
}
