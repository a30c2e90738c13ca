//! Dispatch queue between interaction controllers and the history.
//!
//! Live gestures (a resize drag) produce a stream of actions that should
//! render immediately but land in history as one step. Preview dispatches
//! are applied on top of the committed present without touching history;
//! the final commit is computed from the committed present, so a single
//! undo returns to the tree as it was before the gesture.

use crate::history::{HistoryState, Snapshot};
use crate::reducer::{Action, edit_tree, reduce};
use std::sync::Arc;

/// How an action should reach the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Visual feedback only; replaced by the next preview or commit.
    Preview,
    /// An undoable step.
    Commit,
}

/// Owns the history plus the preview tree of an in-flight gesture.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    state: HistoryState,
    preview: Option<Snapshot>,
}

impl EditorSession {
    pub fn new(state: HistoryState) -> Self {
        Self {
            state,
            preview: None,
        }
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    /// The tree to render: the preview while a gesture is live, else the
    /// committed present.
    pub fn tree(&self) -> &Snapshot {
        self.preview.as_ref().unwrap_or(&self.state.present)
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    /// Apply `action`. Returns `true` if the rendered tree or the editor
    /// side-state changed.
    ///
    /// Only tree edits can be previewed; anything else is committed.
    pub fn dispatch(&mut self, action: &Action, mode: Dispatch) -> bool {
        if mode == Dispatch::Preview && action.edits_tree() {
            let before = self.tree().clone();
            self.preview = edit_tree(&self.state, action);
            return !Arc::ptr_eq(self.tree(), &before);
        }

        let before = self.tree().clone();
        self.preview = None;
        let state = std::mem::take(&mut self.state);
        let (cols, editor) = (state.grid_cols, state.editor.clone());
        self.state = reduce(state, action);
        !Arc::ptr_eq(self.tree(), &before) || self.state.grid_cols != cols || self.state.editor != editor
    }

    /// Drop the preview of an abandoned gesture.
    pub fn cancel_preview(&mut self) -> bool {
        self.preview.take().is_some()
    }
}
