//! Canvas key bindings.
//!
//! | Keys            | Action                                   |
//! |-----------------|------------------------------------------|
//! | ⌘Z, ⌘⇧Z / ⌘Y    | undo, redo                               |
//! | ⌘S, ⌘P          | save now, toggle preview                 |
//! | ⌘[ / ⌘]         | z-index down / up by one                 |
//! | ⌘⇧[ / ⌘⇧]       | send to back / bring to front            |
//! | ⌥⇧↑ / ⌥⇧↓       | reorder among siblings                   |
//! | arrows          | move the selection (⇧ ×10, ⌥ one column) |
//!
//! ⌘ is `meta` on macOS and `ctrl` elsewhere; either one counts.

use crate::input::{ArrowKey, Modifiers};
use crate::reducer::Action;
use pb_core::tree::{self, Location};
use pb_core::{Component, ComponentId, EditorFlags};

/// What a bound key combo asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── History ──
    Undo,
    Redo,

    // ── Page ──
    Save,
    TogglePreview,

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── Structure ──
    /// Move the selection one slot earlier among its siblings.
    ReorderUp,
    /// Move the selection one slot later among its siblings.
    ReorderDown,

    // ── Geometry ──
    Nudge(ArrowKey),
}

/// z-index used by "bring to front".
pub const FRONT_Z: i32 = 999;

/// The canvas key map.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Look up the binding for a `KeyboardEvent.key` value (`"z"`,
    /// `"ArrowUp"`) under the given modifiers. Unbound combos give `None`.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        Self::resolve_with(
            key,
            Modifiers {
                ctrl,
                shift,
                alt,
                meta,
            },
        )
    }

    /// [`resolve`](Self::resolve) with a `Modifiers` bundle.
    pub fn resolve_with(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let Modifiers { shift, alt, .. } = modifiers;

        if modifiers.command() {
            let lower = key.to_ascii_lowercase();
            return match (lower.as_str(), shift) {
                ("z", true) | ("y", false) => Some(ShortcutAction::Redo),
                ("z", false) => Some(ShortcutAction::Undo),
                ("s", false) => Some(ShortcutAction::Save),
                ("p", false) => Some(ShortcutAction::TogglePreview),
                ("[", false) => Some(ShortcutAction::SendBackward),
                ("]", false) => Some(ShortcutAction::BringForward),
                // Shifted brackets arrive as braces on US layouts.
                ("[" | "{", true) => Some(ShortcutAction::SendToBack),
                ("]" | "}", true) => Some(ShortcutAction::BringToFront),
                _ => None,
            };
        }

        let arrow = ArrowKey::from_key(key)?;
        if alt && shift {
            return match arrow {
                ArrowKey::Up => Some(ShortcutAction::ReorderUp),
                ArrowKey::Down => Some(ShortcutAction::ReorderDown),
                ArrowKey::Left | ArrowKey::Right => None,
            };
        }
        Some(ShortcutAction::Nudge(arrow))
    }
}

/// Editor patch for a z-order shortcut, given the selection's current
/// editor z-index. Sending backward stops at 0.
pub fn z_order_patch(action: ShortcutAction, current_z: Option<i32>) -> Option<EditorFlags> {
    let z = current_z.unwrap_or(0);
    let next = match action {
        ShortcutAction::BringForward => z.saturating_add(1),
        ShortcutAction::SendBackward => z.saturating_sub(1).max(0),
        ShortcutAction::BringToFront => FRONT_Z,
        ShortcutAction::SendToBack => 0,
        _ => return None,
    };
    Some(EditorFlags {
        z_index: Some(next),
        ..Default::default()
    })
}

/// `move` action shifting `id` one slot up or down among its siblings.
/// `None` at either end of the list.
pub fn reorder_action(components: &[Component], id: ComponentId, up: bool) -> Option<Action> {
    let from = tree::find_location(components, id)?;
    let siblings = tree::sibling_list(components, from.parent_id)?;
    let last = siblings.len().saturating_sub(1);
    let index = if up {
        from.index.checked_sub(1)?
    } else {
        from.index + 1
    };
    if index > last {
        return None;
    }
    Some(Action::Move {
        from,
        to: Location {
            parent_id: from.parent_id,
            index,
        },
    })
}
