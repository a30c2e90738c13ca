//! Undo/redo history over component tree snapshots.
//!
//! Every state transition consumes a `HistoryState` and returns the next
//! one. Snapshots are shared through `Arc`, and `Arc::ptr_eq` plays the role
//! of reference identity: committing the snapshot that is already `present`
//! is a no-op, which keeps redundant re-dispatches out of the undo stack.
//!
//! `grid_cols` and the editor map ride alongside the snapshots. They survive
//! undo/redo untouched and only change through an explicit [`Carry`].

use pb_core::tree;
use pb_core::{Component, EditorMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One immutable version of the page tree.
pub type Snapshot = Arc<Vec<Component>>;

/// Editor history: past and future snapshots around the present one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    #[serde(default)]
    pub past: Vec<Snapshot>,
    pub present: Snapshot,
    #[serde(default)]
    pub future: Vec<Snapshot>,
    #[serde(default = "default_grid_cols")]
    pub grid_cols: u32,
    #[serde(default)]
    pub editor: EditorMap,
}

fn default_grid_cols() -> u32 {
    HistoryState::DEFAULT_GRID_COLS
}

/// Side-state a commit replaces along with the tree. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carry {
    pub grid_cols: Option<u32>,
    pub editor: Option<EditorMap>,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl HistoryState {
    pub const DEFAULT_GRID_COLS: u32 = 12;

    /// Fresh history around `components`, with no past or future.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            past: Vec::new(),
            present: Arc::new(components),
            future: Vec::new(),
            grid_cols: Self::DEFAULT_GRID_COLS,
            editor: EditorMap::new(),
        }
    }

    /// Fresh history for a page loaded from storage. Containers missing a
    /// `children` list get an empty one.
    pub fn from_page(mut components: Vec<Component>) -> Self {
        tree::ensure_container_children(&mut components);
        Self::new(components)
    }

    /// Restore a saved history. A payload that does not parse falls back to
    /// a fresh history around `fallback`.
    pub fn hydrate(json: &str, fallback: Vec<Component>) -> Self {
        match serde_json::from_str::<HistoryState>(json) {
            Ok(mut state) => {
                let mut present = state.present.as_ref().clone();
                tree::ensure_container_children(&mut present);
                state.present = Arc::new(present);
                state.grid_cols = state.grid_cols.max(1);
                state
            }
            Err(e) => {
                log::warn!("discarding saved history: {e}");
                Self::from_page(fallback)
            }
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Make `next` the present. `past` gains the old present and `future`
    /// is cleared. Committing the present snapshot itself changes nothing.
    pub fn commit(self, next: Snapshot) -> Self {
        self.commit_with(next, Carry::default())
    }

    /// Like [`commit`](Self::commit), also replacing the carried fields.
    ///
    /// When `next` is already the present, only the carried fields change
    /// and no history entry is recorded.
    pub fn commit_with(mut self, next: Snapshot, carry: Carry) -> Self {
        if let Some(cols) = carry.grid_cols {
            self.grid_cols = cols.max(1);
        }
        if let Some(editor) = carry.editor {
            self.editor = editor;
        }
        if Arc::ptr_eq(&next, &self.present) {
            return self;
        }
        log::debug!("history: commit (past {})", self.past.len() + 1);
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push(previous);
        self.future.clear();
        self
    }

    /// Step back one snapshot. No-op at the start of history.
    pub fn undo(mut self) -> Self {
        let Some(previous) = self.past.pop() else {
            return self;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.insert(0, current);
        log::debug!("history: undo (past {}, future {})", self.past.len(), self.future.len());
        self
    }

    /// Step forward one snapshot. No-op at the end of history.
    pub fn redo(mut self) -> Self {
        if self.future.is_empty() {
            return self;
        }
        let next = self.future.remove(0);
        let current = std::mem::replace(&mut self.present, next);
        self.past.push(current);
        log::debug!("history: redo (past {}, future {})", self.past.len(), self.future.len());
        self
    }

    /// Change the grid column count (at least 1). Not an undoable step.
    pub fn set_grid_cols(self, cols: u32) -> Self {
        let present = self.present.clone();
        self.commit_with(
            present,
            Carry {
                grid_cols: Some(cols),
                editor: None,
            },
        )
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Drop the oldest entries so at most `max` past snapshots remain.
    /// History is unbounded unless a caller does this.
    pub fn truncate_past(mut self, max: usize) -> Self {
        if self.past.len() > max {
            let excess = self.past.len() - max;
            self.past.drain(..excess);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::{ComponentId, EditorFlags};
    use pretty_assertions::assert_eq;

    fn snap(ids: &[&str]) -> Snapshot {
        Arc::new(
            ids.iter()
                .map(|id| Component::new(ComponentId::intern(id), "Text"))
                .collect(),
        )
    }

    fn state_with_editor() -> HistoryState {
        let mut state = HistoryState::new(vec![Component::new(ComponentId::intern("h_a"), "Text")]);
        state.grid_cols = 8;
        state.editor.insert(
            ComponentId::intern("h_a"),
            EditorFlags {
                locked: Some(true),
                ..Default::default()
            },
        );
        state
    }

    #[test]
    fn commit_of_present_is_noop() {
        let state = state_with_editor();
        let present = state.present.clone();
        let after = state.clone().commit(present.clone());
        assert!(Arc::ptr_eq(&after.present, &present));
        assert!(after.past.is_empty());
        assert_eq!(after, state);
    }

    #[test]
    fn commit_clears_future() {
        let next = snap(&["h_b"]);
        let state = HistoryState::default().commit(next.clone()).undo();
        assert!(state.can_redo());
        let state = state.commit(snap(&["h_c"]));
        assert!(state.future.is_empty());
        assert_eq!(state.past.len(), 1);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let start = state_with_editor();
        let original = start.present.clone();
        let next = snap(&["h_x", "h_y"]);

        let undone = start.commit(next.clone()).undo();
        assert!(Arc::ptr_eq(&undone.present, &original));
        assert!(Arc::ptr_eq(&undone.future[0], &next));

        let redone = undone.redo();
        assert!(Arc::ptr_eq(&redone.present, &next));
        assert!(Arc::ptr_eq(&redone.past[0], &original));
    }

    #[test]
    fn terminal_undo_and_redo_are_noops() {
        let state = state_with_editor();
        let present = state.present.clone();
        let undone = state.undo();
        assert!(Arc::ptr_eq(&undone.present, &present));
        assert!(undone.future.is_empty());
        let redone = undone.redo();
        assert!(Arc::ptr_eq(&redone.present, &present));
        assert!(redone.past.is_empty());
    }

    #[test]
    fn grid_and_editor_survive_history_moves() {
        let start = state_with_editor();
        let (cols, editor) = (start.grid_cols, start.editor.clone());
        let state = start
            .commit(snap(&["h_1"]))
            .commit(snap(&["h_2"]))
            .undo()
            .undo()
            .redo()
            .commit(snap(&["h_3"]))
            .undo();
        assert_eq!(state.grid_cols, cols);
        assert_eq!(state.editor, editor);
    }

    #[test]
    fn carry_replaces_side_state_without_history() {
        let state = state_with_editor();
        let present = state.present.clone();
        let state = state.commit_with(
            present,
            Carry {
                grid_cols: Some(0),
                editor: Some(EditorMap::new()),
            },
        );
        assert_eq!(state.grid_cols, 1);
        assert!(state.editor.is_empty());
        assert!(!state.can_undo());
    }

    #[test]
    fn truncate_keeps_most_recent() {
        let mut state = HistoryState::default();
        let snaps: Vec<Snapshot> = (0..5).map(|i| snap(&[format!("h_t{i}").as_str()])).collect();
        for s in &snaps {
            state = state.commit(s.clone());
        }
        let state = state.truncate_past(2);
        assert_eq!(state.past.len(), 2);
        assert!(Arc::ptr_eq(&state.past[1], &snaps[3]));
    }

    #[test]
    fn hydrate_falls_back_on_bad_payload() {
        let fallback = vec![Component::new(ComponentId::intern("h_sec"), "Section")];
        let state = HistoryState::hydrate("{ not json", fallback);
        assert_eq!(state.grid_cols, HistoryState::DEFAULT_GRID_COLS);
        assert_eq!(state.present[0].children, Some(Vec::new()));
        assert!(state.editor.is_empty());
    }

    #[test]
    fn hydrate_restores_saved_history() {
        let json = r#"{
            "past": [[{ "id": "h_old", "type": "Text" }]],
            "present": [{ "id": "h_cols", "type": "MultiColumn" }],
            "gridCols": 0,
            "editor": { "h_cols": { "name": "Columns" } }
        }"#;
        let state = HistoryState::hydrate(json, Vec::new());
        assert_eq!(state.past.len(), 1);
        assert_eq!(state.grid_cols, 1);
        assert_eq!(state.present[0].children, Some(Vec::new()));
        assert_eq!(
            state.editor[&ComponentId::intern("h_cols")].name.as_deref(),
            Some("Columns")
        );
    }
}
