//! Integration tests: history engine driven through the reducer
//! (pb-editor ↔ pb-core).

use pb_core::tree;
use pb_core::{Component, ComponentId, CssValue, EditorFlags, Viewport};
use pb_editor::history::{HistoryState, Snapshot};
use pb_editor::reducer::{Action, reduce};
use pretty_assertions::assert_eq;
use smallvec::smallvec;
use std::sync::Arc;

fn id(s: &str) -> ComponentId {
    ComponentId::intern(s)
}

fn page() -> HistoryState {
    let json = include_str!("fixtures/landing.json");
    let components: Vec<Component> = serde_json::from_str(json).unwrap();
    let mut state = HistoryState::from_page(components);
    state.grid_cols = 16;
    state.editor.insert(
        id("ur_title"),
        EditorFlags {
            hidden: Some(smallvec![Viewport::Mobile]),
            ..Default::default()
        },
    );
    state
}

fn snapshot(tag: &str) -> Snapshot {
    Arc::new(vec![Component::new(id(tag), "Text")])
}

// ─── Engine properties ──────────────────────────────────────────────────

#[test]
fn committing_present_returns_same_state() {
    let state = page();
    let present = state.present.clone();
    let expected = state.clone();
    let next = state.commit(present.clone());
    assert!(Arc::ptr_eq(&next.present, &present));
    assert_eq!(next, expected);
}

#[test]
fn undo_inverts_commit_and_redo_restores() {
    let s = page();
    let before = s.present.clone();
    let next = snapshot("ur_next");

    let undone = s.commit(next.clone()).undo();
    assert!(Arc::ptr_eq(&undone.present, &before));
    assert!(Arc::ptr_eq(&undone.future[0], &next));

    let redone = undone.redo();
    assert!(Arc::ptr_eq(&redone.present, &next));
    assert!(!redone.can_redo());
}

#[test]
fn history_never_holds_present() {
    let mut s = page();
    for tag in ["ur_a", "ur_b", "ur_c"] {
        s = s.commit(snapshot(tag));
    }
    s = s.undo().undo().redo();
    let present = s.present.clone();
    assert!(!s.past.iter().chain(&s.future).any(|p| Arc::ptr_eq(p, &present)));
}

#[test]
fn side_state_survives_any_sequence() {
    let s = page();
    let (cols, editor) = (s.grid_cols, s.editor.clone());
    let s = s
        .commit(snapshot("ur_1"))
        .commit(snapshot("ur_2"))
        .undo()
        .undo()
        .undo()
        .redo()
        .commit(snapshot("ur_3"))
        .redo();
    assert_eq!(s.grid_cols, cols);
    assert_eq!(s.editor, editor);
}

// ─── Through actions ────────────────────────────────────────────────────

#[test]
fn each_edit_is_one_undo_step() {
    let mut s = page();
    let actions = [
        Action::Duplicate { id: id("ur_title") },
        Action::Remove { id: id("ur_cta") },
        serde_json::from_str(r#"{"type":"resize","id":"ur_hero","heightTablet":"480px"}"#).unwrap(),
    ];
    for action in &actions {
        s = reduce(s, action);
    }
    assert_eq!(s.past.len(), 3);

    let hero = tree::find(&s.present, id("ur_hero")).unwrap();
    assert_eq!(hero.layout.height_tablet, Some(CssValue::from("480px")));

    for _ in 0..3 {
        s = reduce(s, &Action::Undo);
    }
    assert_eq!(*s.present, *page().present);
    assert_eq!(s.future.len(), 3);
}

#[test]
fn new_edit_after_undo_drops_redo_branch() {
    let s = reduce(page(), &Action::Remove { id: id("ur_cta") });
    let s = reduce(s, &Action::Undo);
    assert!(s.can_redo());
    let s = reduce(s, &Action::Remove { id: id("ur_title") });
    assert!(!s.can_redo());
    assert!(tree::find(&s.present, id("ur_cta")).is_some());
}

#[test]
fn ignored_actions_leave_history_alone() {
    let s = page();
    let expected = s.clone();
    let s = reduce(s, &Action::Remove { id: id("ur_missing") });
    let s = reduce(s, &Action::Undo);
    let s = reduce(s, &Action::Redo);
    assert_eq!(s, expected);
}

#[test]
fn saved_history_restores_stacks() {
    let s = reduce(page(), &Action::Remove { id: id("ur_cta") });
    let s = reduce(s, &Action::SetGridCols { grid_cols: 24 });
    let json = serde_json::to_string(&s).unwrap();

    let restored = HistoryState::hydrate(&json, Vec::new());
    assert_eq!(restored.past.len(), 1);
    assert_eq!(restored.grid_cols, 24);
    assert_eq!(*restored.present, *s.present);
    assert!(restored.editor[&id("ur_title")].is_hidden_in(Viewport::Mobile));
}
