//! Editor actions and the reducer that applies them to `HistoryState`.
//!
//! Actions arrive as JSON from the host (`{"type": "resize", "id": ...}`),
//! so the enum mirrors that shape. Tree edits build a new snapshot from the
//! present and commit it; actions aimed at a missing or locked component
//! are dropped without touching the state.

use crate::history::{Carry, HistoryState, Snapshot};
use pb_core::tree::{self, Location};
use pb_core::{Component, ComponentId, CssValue, EditorFlags, LayoutKey, effective_locked};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Everything the host can ask the editor to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    Undo,
    Redo,
    /// Set viewport-qualified size/offset attributes, e.g.
    /// `{"type":"resize","id":"hero","widthDesktop":"320px"}`.
    Resize {
        id: ComponentId,
        #[serde(flatten)]
        values: BTreeMap<LayoutKey, String>,
    },
    /// Overwrite component fields. A `null` value removes the field.
    Update {
        id: ComponentId,
        patch: Map<String, Value>,
    },
    /// Merge editor-only flags (name, lock, visibility, z-index).
    UpdateEditor { id: ComponentId, patch: EditorFlags },
    /// Insert `component` into `parentId` (root when absent) at `index`
    /// (end when absent).
    Add {
        component: Component,
        #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
        parent_id: Option<ComponentId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    Remove { id: ComponentId },
    /// Deep copy with fresh IDs, inserted right after the original.
    Duplicate { id: ComponentId },
    Move { from: Location, to: Location },
    /// Replace the whole tree.
    Set { components: Vec<Component> },
    SetGridCols {
        #[serde(rename = "gridCols")]
        grid_cols: u32,
    },
}

impl Action {
    /// Resize action carrying whole-pixel values for two attributes.
    pub fn resize(id: ComponentId, entries: impl IntoIterator<Item = (LayoutKey, f64)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(key, px)| (key, CssValue::px(px).to_string()))
            .collect();
        Action::Resize { id, values }
    }

    /// Whether this action edits the tree (as opposed to moving through
    /// history or changing side-state).
    pub fn edits_tree(&self) -> bool {
        !matches!(
            self,
            Action::Undo | Action::Redo | Action::UpdateEditor { .. } | Action::SetGridCols { .. }
        )
    }
}

/// Apply `action`, returning the next state. Ignored actions return
/// `state` unchanged.
pub fn reduce(state: HistoryState, action: &Action) -> HistoryState {
    match action {
        Action::Undo => state.undo(),
        Action::Redo => state.redo(),
        Action::SetGridCols { grid_cols } => state.set_grid_cols(*grid_cols),
        Action::UpdateEditor { id, patch } => update_editor(state, *id, patch),
        _ => match edit_tree(&state, action) {
            Some(next) => state.commit(next),
            None => state,
        },
    }
}

/// The tree `action` would produce from the present snapshot, or `None`
/// when the action is ignored or changes nothing.
pub fn edit_tree(state: &HistoryState, action: &Action) -> Option<Snapshot> {
    let mut next = state.present.as_ref().clone();
    match action {
        Action::Resize { id, values } => {
            editable(state, *id)?;
            let node = tree::find_mut(&mut next, *id)?;
            for (key, value) in values {
                node.layout.set(*key, CssValue::Text(value.clone()));
            }
        }
        Action::Update { id, patch } => {
            editable(state, *id)?;
            let node = tree::find_mut(&mut next, *id)?;
            *node = patched(node, patch)?;
        }
        Action::Add {
            component,
            parent_id,
            index,
        } => {
            let mut component = component.clone();
            let incoming = tree::collect_ids(std::slice::from_ref(&component));
            if incoming.iter().any(|id| tree::find(&next, *id).is_some()) {
                log::debug!("ignoring add: {} already exists", component.id);
                return None;
            }
            if incoming.iter().collect::<HashSet<_>>().len() != incoming.len() {
                log::debug!("ignoring add: {} repeats an id", component.id);
                return None;
            }
            tree::ensure_container_children(std::slice::from_mut(&mut component));
            let at = Location {
                parent_id: *parent_id,
                index: index.unwrap_or(usize::MAX),
            };
            if !tree::insert(&mut next, at, component) {
                log::debug!("ignoring add: no container {parent_id:?}");
                return None;
            }
        }
        Action::Remove { id } => {
            editable(state, *id)?;
            tree::remove(&mut next, *id)?;
        }
        Action::Duplicate { id } => {
            let source = tree::find(&next, *id)?;
            let copy = tree::with_fresh_ids(source);
            let loc = tree::find_location(&next, *id)?;
            let at = Location {
                parent_id: loc.parent_id,
                index: loc.index + 1,
            };
            tree::insert(&mut next, at, copy);
        }
        Action::Move { from, to } => {
            let moving = tree::sibling_list(&next, from.parent_id)
                .and_then(|list| list.get(from.index))
                .map(|c| c.id)?;
            editable(state, moving)?;
            if !tree::move_node(&mut next, *from, *to) {
                log::debug!("ignoring move of {moving}: invalid target");
                return None;
            }
        }
        Action::Set { components } => {
            next = components.clone();
            tree::ensure_container_children(&mut next);
        }
        Action::Undo | Action::Redo | Action::UpdateEditor { .. } | Action::SetGridCols { .. } => {
            return None;
        }
    }
    (next != *state.present).then(|| Arc::new(next))
}

/// Guard clause: the target exists and is not locked.
fn editable(state: &HistoryState, id: ComponentId) -> Option<&Component> {
    let Some(node) = tree::find(&state.present, id) else {
        log::debug!("ignoring action: no component {id}");
        return None;
    };
    if effective_locked(node, &state.editor) {
        log::debug!("ignoring action: {id} is locked");
        return None;
    }
    Some(node)
}

/// `node` with `patch` written over its fields. The ID and children are
/// structural and cannot be patched.
fn patched(node: &Component, patch: &Map<String, Value>) -> Option<Component> {
    let mut value = serde_json::to_value(node).ok()?;
    let fields = value.as_object_mut()?;
    for (key, v) in patch {
        if key == "id" || key == "children" {
            continue;
        }
        if v.is_null() {
            fields.remove(key);
        } else {
            fields.insert(key.clone(), v.clone());
        }
    }
    serde_json::from_value(value)
        .map_err(|e| log::debug!("ignoring update of {}: {e}", node.id))
        .ok()
}

fn update_editor(state: HistoryState, id: ComponentId, patch: &EditorFlags) -> HistoryState {
    if tree::find(&state.present, id).is_none() {
        log::debug!("ignoring editor update: no component {id}");
        return state;
    }
    let mut editor = state.editor.clone();
    editor.entry(id).or_default().merge(patch.clone());
    if editor == state.editor {
        return state;
    }
    let present = state.present.clone();
    state.commit_with(
        present,
        Carry {
            grid_cols: None,
            editor: Some(editor),
        },
    )
}
