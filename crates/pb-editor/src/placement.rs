//! Positioning helpers for absolutely placed blocks: arrow-key moves and
//! pin/stretch docking computed from measured rectangles.

use crate::input::{ArrowKey, Modifiers};
use crate::reducer::Action;
use pb_core::{
    Component, ComponentId, Dimension, EditorMap, LayoutKey, Length, Position, Viewport,
    effective_locked,
};
use serde_json::{Map, Value};

/// Client rectangle of an element, in px.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

// ─── Arrow-key moves ─────────────────────────────────────────────────────

/// Distance of one arrow-key move: one grid column with Alt (when the
/// column width is known), 10px with Shift, else 1px.
pub fn move_step(modifiers: Modifiers, column_width: Option<f64>) -> f64 {
    match column_width {
        Some(unit) if modifiers.alt && unit > 0.0 => unit,
        _ if modifiers.shift => 10.0,
        _ => 1.0,
    }
}

/// Furthest `left`/`top` that keeps `element` inside `parent`, or `None`
/// when the parent is unknown.
pub fn max_offsets(element: Rect, parent: Option<Rect>) -> Option<(f64, f64)> {
    parent.map(|p| {
        (
            (p.width() - element.width()).max(0.0),
            (p.height() - element.height()).max(0.0),
        )
    })
}

/// Move an absolutely positioned, unlocked component by `step` px.
///
/// Left/right edit `left<Viewport>`, up/down edit `top<Viewport>`, starting
/// from the viewport value or else the base one. The result is clamped to
/// `[0, max]` when `max` (from [`max_offsets`]) is known.
pub fn move_action(
    component: &Component,
    editor: &EditorMap,
    viewport: Viewport,
    key: ArrowKey,
    step: f64,
    max: Option<(f64, f64)>,
) -> Option<Action> {
    if component.layout.position != Some(Position::Absolute) || effective_locked(component, editor) {
        return None;
    }
    let (dimension, limit) = if key.is_horizontal() {
        (Dimension::Left, max.map(|m| m.0))
    } else {
        (Dimension::Top, max.map(|m| m.1))
    };
    let current = component
        .layout
        .resolve(dimension, viewport)
        .and_then(|v| v.numeric())
        .unwrap_or(0.0);
    let mut next = current + key.sign() * step;
    if let Some(limit) = limit {
        next = next.clamp(0.0, limit);
    }
    Some(Action::resize(
        component.id,
        [(LayoutKey::for_viewport(dimension, viewport), next)],
    ))
}

// ─── Pin / stretch ───────────────────────────────────────────────────────

/// Docking shortcuts from the layout panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pin {
    Left,
    Right,
    Top,
    Bottom,
    /// Pin both horizontal edges and let the width follow.
    StretchX,
    /// Pin both vertical edges and let the height follow.
    StretchY,
}

/// `update` action that pins `id` where it currently sits inside `parent`.
/// Offsets are whole pixels; the opposite edge (or the size, when
/// stretching) is cleared.
pub fn pin_action(id: ComponentId, pin: Pin, element: Rect, parent: Rect) -> Action {
    let left = px(element.left - parent.left);
    let right = px(parent.right - element.right);
    let top = px(element.top - parent.top);
    let bottom = px(parent.bottom - element.bottom);

    let mut patch = Map::new();
    let mut set = |key: &str, value: Value| {
        patch.insert(key.to_string(), value);
    };
    match pin {
        Pin::Left => {
            set("dockX", "left".into());
            set("left", left);
            set("right", Value::Null);
        }
        Pin::Right => {
            set("dockX", "right".into());
            set("right", right);
            set("left", Value::Null);
        }
        Pin::Top => {
            set("dockY", "top".into());
            set("top", top);
            set("bottom", Value::Null);
        }
        Pin::Bottom => {
            set("dockY", "bottom".into());
            set("bottom", bottom);
            set("top", Value::Null);
        }
        Pin::StretchX => {
            set("dockX", "left".into());
            set("left", left);
            set("right", right);
            set("width", Value::Null);
        }
        Pin::StretchY => {
            set("dockY", "top".into());
            set("top", top);
            set("bottom", bottom);
            set("height", Value::Null);
        }
    }
    Action::Update { id, patch }
}

fn px(n: f64) -> Value {
    Value::String(Length::px(n.round()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryState;
    use crate::reducer::reduce;
    use pb_core::{CssValue, DockX, EditorFlags, tree};
    use pretty_assertions::assert_eq;

    fn absolute(id: &str) -> Component {
        let mut c = Component::new(ComponentId::intern(id), "Image");
        c.layout.position = Some(Position::Absolute);
        c.layout.left = Some(CssValue::from("20px"));
        c
    }

    fn value_of(action: &Action) -> (String, String) {
        let Action::Resize { values, .. } = action else {
            panic!("expected resize, got {action:?}");
        };
        let (k, v) = values.iter().next().unwrap();
        (k.to_string(), v.clone())
    }

    #[test]
    fn step_follows_modifiers() {
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        let shift = Modifiers {
            shift: true,
            ..Modifiers::NONE
        };
        assert_eq!(move_step(Modifiers::NONE, Some(80.0)), 1.0);
        assert_eq!(move_step(shift, None), 10.0);
        assert_eq!(move_step(alt, Some(80.0)), 80.0);
        assert_eq!(move_step(alt, None), 1.0);
    }

    #[test]
    fn moves_from_base_offset_into_viewport_key() {
        let c = absolute("pl_a");
        let action = move_action(
            &c,
            &EditorMap::new(),
            Viewport::Tablet,
            ArrowKey::Right,
            10.0,
            None,
        )
        .unwrap();
        assert_eq!(value_of(&action), ("leftTablet".into(), "30px".into()));

        let action = move_action(&c, &EditorMap::new(), Viewport::Tablet, ArrowKey::Up, 1.0, None).unwrap();
        assert_eq!(value_of(&action), ("topTablet".into(), "-1px".into()));
    }

    #[test]
    fn clamps_to_parent_box() {
        let c = absolute("pl_b");
        let max = max_offsets(
            Rect {
                left: 0.0,
                top: 0.0,
                right: 50.0,
                bottom: 50.0,
            },
            Some(Rect {
                left: 0.0,
                top: 0.0,
                right: 75.0,
                bottom: 60.0,
            }),
        );
        assert_eq!(max, Some((25.0, 10.0)));
        let action = move_action(
            &c,
            &EditorMap::new(),
            Viewport::Desktop,
            ArrowKey::Right,
            10.0,
            max,
        )
        .unwrap();
        assert_eq!(value_of(&action).1, "25px");
        let action = move_action(&c, &EditorMap::new(), Viewport::Desktop, ArrowKey::Up, 10.0, max).unwrap();
        assert_eq!(value_of(&action).1, "0px");
    }

    #[test]
    fn ignores_flow_and_locked_blocks() {
        let mut flow = absolute("pl_flow");
        flow.layout.position = Some(Position::Relative);
        assert!(move_action(&flow, &EditorMap::new(), Viewport::Desktop, ArrowKey::Left, 1.0, None).is_none());

        let c = absolute("pl_locked");
        let mut editor = EditorMap::new();
        editor.insert(
            c.id,
            EditorFlags {
                locked: Some(true),
                ..Default::default()
            },
        );
        assert!(move_action(&c, &editor, Viewport::Desktop, ArrowKey::Left, 1.0, None).is_none());
    }

    #[test]
    fn pin_right_measures_and_clears_left() {
        let c = absolute("pl_pin");
        let id = c.id;
        let element = Rect {
            left: 110.0,
            top: 20.0,
            right: 160.4,
            bottom: 70.0,
        };
        let parent = Rect {
            left: 100.0,
            top: 0.0,
            right: 300.0,
            bottom: 200.0,
        };
        let state = HistoryState::new(vec![c]);
        let state = reduce(state, &pin_action(id, Pin::Right, element, parent));
        let pinned = tree::find(&state.present, id).unwrap();
        assert_eq!(pinned.layout.dock_x, Some(DockX::Right));
        assert_eq!(pinned.layout.right, Some(CssValue::from("140px")));
        assert_eq!(pinned.layout.left, None);
    }

    #[test]
    fn stretch_clears_size() {
        let Action::Update { patch, .. } = pin_action(
            ComponentId::intern("pl_s"),
            Pin::StretchY,
            Rect {
                left: 0.0,
                top: 5.0,
                right: 10.0,
                bottom: 15.0,
            },
            Rect {
                left: 0.0,
                top: 0.0,
                right: 10.0,
                bottom: 40.0,
            },
        ) else {
            panic!("expected update");
        };
        assert_eq!(patch["top"], "5px");
        assert_eq!(patch["bottom"], "25px");
        assert_eq!(patch["height"], Value::Null);
    }
}
