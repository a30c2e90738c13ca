//! WASM bridge exposing the page builder engine to the browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host renders the
//! decorated tree and style declarations returned here, forwards pointer
//! and key events, and runs the actual save request when autosave asks
//! for one.

mod dom;

use dom::DomElement;
use pb_core::decorate::{arrange_children, visible_children};
use pb_core::{
    Component, ComponentId, EditorMap, Length, PlacementIntent, Unit, UnitContext, Viewport,
    compute_block_style, decorate_tree, effective_locked, tree,
};
use pb_editor::autosave::{AutosaveConfig, AutosaveMachine, SaveError};
use pb_editor::history::HistoryState;
use pb_editor::input::{ArrowKey, Modifiers};
use pb_editor::placement::{self, Pin};
use pb_editor::reducer::Action;
use pb_editor::resize::{KeyboardNudger, NudgeConfig, ResizeController, ResizeTarget};
use pb_editor::session::{Dispatch, EditorSession};
use pb_editor::shortcuts::{self, ShortcutAction, ShortcutMap};
use std::sync::Arc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

/// The main WASM-facing editor controller.
///
/// Holds the history session, interaction controllers, and autosave state.
/// All interaction from the host JS goes through this struct.
#[wasm_bindgen]
pub struct PageBuilder {
    session: EditorSession,
    resize: ResizeController,
    /// Element under an active resize drag; receives capture release.
    resize_element: Option<DomElement>,
    nudger: KeyboardNudger,
    autosave: AutosaveMachine<String>,
    viewport: Viewport,
    selected: Option<ComponentId>,
    preview_mode: bool,
}

#[wasm_bindgen]
impl PageBuilder {
    /// Create an editor for a page. `page_json` is the stored component
    /// list; `history_json`, when given, is a saved history to restore
    /// (falling back to the page if it does not parse).
    #[wasm_bindgen(constructor)]
    pub fn new(page_json: &str, history_json: Option<String>) -> Result<PageBuilder, JsValue> {
        console_error_panic_hook_setup();

        let components: Vec<Component> = serde_json::from_str(page_json)
            .map_err(|e| JsValue::from_str(&format!("invalid page: {e}")))?;
        let state = match history_json {
            Some(json) => HistoryState::hydrate(&json, components),
            None => HistoryState::from_page(components),
        };
        Ok(Self::from_state(state))
    }

    // ─── Viewport & selection ────────────────────────────────────────────

    /// Switch the edited viewport. Returns `false` for an unknown name.
    pub fn set_viewport(&mut self, name: &str) -> bool {
        match name.parse::<Viewport>() {
            Ok(vp) => {
                self.viewport = vp;
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn get_viewport(&self) -> String {
        self.viewport.as_str().to_string()
    }

    /// Select a component by ID, or clear the selection with an empty
    /// string. Returns `false` if the ID is not in the tree.
    pub fn select(&mut self, id: &str) -> bool {
        if id.is_empty() {
            self.selected = None;
            return true;
        }
        let id = ComponentId::intern(id);
        if tree::find(self.session.tree(), id).is_none() {
            return false;
        }
        self.selected = Some(id);
        let locked = self.is_locked(id);
        self.nudger.set_disabled(locked);
        true
    }

    pub fn get_selected_id(&self) -> String {
        self.selected.map(|id| id.as_str().to_string()).unwrap_or_default()
    }

    pub fn is_preview_mode(&self) -> bool {
        self.preview_mode
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// The tree decorated for the current viewport, as JSON.
    pub fn get_tree_json(&self) -> String {
        let decorated = decorate_tree(self.session.tree(), &self.session.state().editor, self.viewport);
        serde_json::to_string(&decorated).unwrap_or_else(|_| "[]".to_string())
    }

    /// Style declarations for one component in the current viewport, as a
    /// JSON object (camelCase keys). Empty string if the ID is unknown.
    pub fn get_style_json(&self, id: &str) -> String {
        self.style_for(ComponentId::intern(id))
            .and_then(|s| serde_json::to_string(&s).ok())
            .unwrap_or_default()
    }

    /// Inline CSS text for one component in the current viewport.
    pub fn get_style_css(&self, id: &str) -> String {
        self.style_for(ComponentId::intern(id))
            .map(|s| s.to_css())
            .unwrap_or_default()
    }

    /// IDs of `parent_id`'s children that render in the current viewport,
    /// in stacking order, as a JSON array. The root list when empty.
    pub fn get_children_order(&self, parent_id: &str) -> String {
        let editor = &self.session.state().editor;
        let ids: Vec<&str> = if parent_id.is_empty() {
            visible_children(self.session.tree(), editor, self.viewport)
                .into_iter()
                .map(|c| c.id.as_str())
                .collect()
        } else {
            let Some(parent) = tree::find(self.session.tree(), ComponentId::intern(parent_id)) else {
                return "[]".to_string();
            };
            arrange_children(parent, editor, self.viewport)
                .into_iter()
                .filter(|c| !pb_core::is_hidden_for_viewport(c.id, editor, c.hidden, self.viewport))
                .map(|c| c.id.as_str())
                .collect()
        };
        serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
    }

    /// Grid column width for a canvas `canvas_width` px wide.
    pub fn column_width(&self, canvas_width: f64) -> f64 {
        canvas_width / self.session.state().grid_cols as f64
    }

    /// `{"gridCols":n,"canUndo":bool,"canRedo":bool,"previewing":bool}`
    pub fn get_history_info(&self) -> String {
        let state = self.session.state();
        serde_json::json!({
            "gridCols": state.grid_cols,
            "canUndo": state.can_undo(),
            "canRedo": state.can_redo(),
            "previewing": self.session.is_previewing(),
        })
        .to_string()
    }

    /// The full history for persistence across reloads.
    pub fn get_history_json(&self) -> String {
        serde_json::to_string(self.session.state()).unwrap_or_default()
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    /// Apply a host action (`{"type":"resize","id":...}`) as an undoable
    /// step. Returns `true` if anything visible changed.
    pub fn dispatch_json(&mut self, action_json: &str) -> bool {
        match serde_json::from_str::<Action>(action_json) {
            Ok(action) => self.apply(&action, Dispatch::Commit),
            Err(e) => {
                log::warn!("ignoring malformed action: {e}");
                false
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        self.apply(&Action::Undo, Dispatch::Commit)
    }

    pub fn redo(&mut self) -> bool {
        self.apply(&Action::Redo, Dispatch::Commit)
    }

    /// Pin or stretch the selection inside its parent element.
    /// `pin` is one of `left`, `right`, `top`, `bottom`, `stretch-x`,
    /// `stretch-y`.
    pub fn pin_selected(&mut self, pin: &str, element: HtmlElement) -> bool {
        let pin = match pin {
            "left" => Pin::Left,
            "right" => Pin::Right,
            "top" => Pin::Top,
            "bottom" => Pin::Bottom,
            "stretch-x" => Pin::StretchX,
            "stretch-y" => Pin::StretchY,
            _ => return false,
        };
        let Some(id) = self.selected else {
            return false;
        };
        let element = DomElement(element);
        let Some(parent) = element.parent_rect() else {
            return false;
        };
        let action = placement::pin_action(id, pin, element.rect(), parent);
        self.apply(&action, Dispatch::Commit)
    }

    // ─── Pointer resize ──────────────────────────────────────────────────

    /// Start resizing the selection from its handle. `snap` is the grid
    /// increment in px (0 for free resizing).
    pub fn resize_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        pointer_id: i32,
        snap: f64,
        element: HtmlElement,
    ) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        if self.is_locked(id) {
            return false;
        }
        let element = DomElement(element);
        self.end_resize();
        self.resize.pointer_down(
            ResizeTarget::for_viewport(id, self.viewport),
            x,
            y,
            pointer_id,
            snap,
            &element,
        );
        self.resize_element = Some(element);
        true
    }

    /// Live resize feedback. Returns `true` if the rendered tree changed.
    pub fn resize_pointer_move(&mut self, x: f64, y: f64, pointer_id: i32) -> bool {
        match self.resize.pointer_move(x, y, pointer_id) {
            Some(action) => self.apply(&action, Dispatch::Preview),
            None => false,
        }
    }

    /// Finish the drag, committing the final size as one undo step.
    pub fn resize_pointer_up(&mut self, x: f64, y: f64, pointer_id: i32) -> bool {
        let Some(element) = self.resize_element.clone() else {
            return false;
        };
        let action = self.resize.pointer_up(x, y, pointer_id, &element);
        if self.resize.is_active() {
            // Release from another pointer; the drag goes on.
            return false;
        }
        self.resize_element = None;
        match action {
            Some(action) => self.apply(&action, Dispatch::Commit),
            None => self.session.cancel_preview(),
        }
    }

    /// Abandon the drag (pointer cancel, handle unmounted).
    pub fn resize_cancel(&mut self) -> bool {
        self.end_resize()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_active()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key event on the canvas. Returns a JSON string:
    /// `{"changed":bool,"action":"<name>"}`.
    ///
    /// `element` is the selected block's element, used to clamp arrow moves
    /// to its parent; `canvas_width` sizes the Alt+arrow grid step.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        canvas_width: f64,
        element: Option<HtmlElement>,
    ) -> String {
        let mods = Modifiers {
            ctrl,
            shift,
            alt,
            meta,
        };
        let Some(action) = ShortcutMap::resolve_with(key, mods) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = if self.preview_mode && action != ShortcutAction::TogglePreview {
            false
        } else {
            self.run_shortcut(action, mods, canvas_width, element.map(DomElement))
        };
        let name = action_to_name(action);
        format!(r#"{{"changed":{changed},"action":"{name}"}}"#)
    }

    /// Resize the selection with an arrow key pressed on its resize
    /// handle. Returns `true` if the size changed.
    pub fn nudge_size(&mut self, key: &str, element: HtmlElement) -> bool {
        let (Some(id), Some(arrow)) = (self.selected, ArrowKey::from_key(key)) else {
            return false;
        };
        let Some(style) = self.style_for(id) else {
            return false;
        };
        let target = ResizeTarget::for_viewport(id, self.viewport);
        match self.nudger.nudge(&target, arrow, &style, &DomElement(element), now()) {
            Some(action) => self.apply(&action, Dispatch::Commit),
            None => false,
        }
    }

    /// Whether the size readout overlay should show.
    pub fn is_size_overlay_visible(&self) -> bool {
        self.nudger.overlay_visible(now())
    }

    // ─── Autosave ────────────────────────────────────────────────────────

    /// Advance the autosave timers. Returns the payload to save when a
    /// save should start; the host reports the outcome through
    /// `autosave_succeeded` / `autosave_failed`.
    pub fn autosave_poll(&mut self) -> Option<String> {
        self.autosave.poll(now())
    }

    pub fn autosave_succeeded(&mut self) {
        self.autosave.on_saved(now());
    }

    pub fn autosave_failed(&mut self, message: &str) {
        self.autosave.on_failed(&SaveError::new(message));
    }

    /// Re-attempt a failed save. Returns the payload to save, if the last
    /// save failed.
    pub fn autosave_retry(&mut self) -> Option<String> {
        self.autosave.retry()
    }

    /// Current save indicator as JSON, e.g. `{"state":"saving"}`.
    pub fn autosave_status_json(&self) -> String {
        serde_json::to_string(self.autosave.status()).unwrap_or_default()
    }

    /// Milliseconds until `autosave_poll` has work, if any.
    pub fn autosave_next_wakeup_ms(&self) -> Option<f64> {
        let now = now();
        self.autosave
            .next_wakeup()
            .map(|at| at.saturating_sub(now).as_secs_f64() * 1000.0)
    }
}

impl PageBuilder {
    fn from_state(state: HistoryState) -> Self {
        Self {
            session: EditorSession::new(state),
            resize: ResizeController::new(),
            resize_element: None,
            nudger: KeyboardNudger::new(NudgeConfig::default()),
            autosave: AutosaveMachine::new(AutosaveConfig::default()),
            viewport: Viewport::Desktop,
            selected: None,
            preview_mode: false,
        }
    }

    /// Route `action` through the session; committed tree changes are
    /// queued for autosave.
    fn apply(&mut self, action: &Action, mode: Dispatch) -> bool {
        let before = self.session.state().present.clone();
        let changed = self.session.dispatch(action, mode);
        let present = &self.session.state().present;
        if !Arc::ptr_eq(present, &before) {
            match serde_json::to_string(present.as_ref()) {
                Ok(payload) => self.autosave.on_change(payload, now()),
                Err(e) => log::warn!("autosave: cannot serialize page: {e}"),
            }
            if let Some(id) = self.selected
                && tree::find(present, id).is_none()
            {
                self.selected = None;
            }
        }
        if let Some(id) = self.selected {
            let locked = self.is_locked(id);
            self.nudger.set_disabled(locked);
        }
        changed
    }

    fn end_resize(&mut self) -> bool {
        let ended = match self.resize_element.take() {
            Some(element) => self.resize.cancel(&element),
            None => false,
        };
        self.session.cancel_preview() || ended
    }

    fn is_locked(&self, id: ComponentId) -> bool {
        tree::find(self.session.tree(), id)
            .is_some_and(|c| effective_locked(c, &self.session.state().editor))
    }

    fn style_for(&self, id: ComponentId) -> Option<pb_core::StyleDescriptor> {
        let component = tree::find(self.session.tree(), id)?;
        let intent = PlacementIntent::for_component(component, &self.session.state().editor, self.viewport);
        Some(compute_block_style(&intent))
    }

    fn run_shortcut(
        &mut self,
        action: ShortcutAction,
        mods: Modifiers,
        canvas_width: f64,
        element: Option<DomElement>,
    ) -> bool {
        match action {
            ShortcutAction::Undo => self.apply(&Action::Undo, Dispatch::Commit),
            ShortcutAction::Redo => self.apply(&Action::Redo, Dispatch::Commit),
            // The host owns the save request.
            ShortcutAction::Save => false,
            ShortcutAction::TogglePreview => {
                self.preview_mode = !self.preview_mode;
                self.end_resize();
                true
            }
            ShortcutAction::SendBackward
            | ShortcutAction::BringForward
            | ShortcutAction::SendToBack
            | ShortcutAction::BringToFront => {
                let Some(id) = self.selected else {
                    return false;
                };
                let current = self.session.state().editor.get(&id).and_then(|f| f.z_index);
                match shortcuts::z_order_patch(action, current) {
                    Some(patch) => self.apply(&Action::UpdateEditor { id, patch }, Dispatch::Commit),
                    None => false,
                }
            }
            ShortcutAction::ReorderUp | ShortcutAction::ReorderDown => {
                let Some(id) = self.selected else {
                    return false;
                };
                let up = action == ShortcutAction::ReorderUp;
                match shortcuts::reorder_action(self.session.tree(), id, up) {
                    Some(a) => self.apply(&a, Dispatch::Commit),
                    None => false,
                }
            }
            ShortcutAction::Nudge(arrow) => {
                let Some(id) = self.selected else {
                    return false;
                };
                let column = (canvas_width > 0.0).then(|| self.column_width(canvas_width));
                let step = placement::move_step(mods, column);
                let max = element.and_then(|el| placement::max_offsets(el.rect(), el.parent_rect()));
                let editor = &self.session.state().editor;
                let action = tree::find(self.session.tree(), id).and_then(|c| {
                    placement::move_action(c, editor, self.viewport, arrow, step, max)
                });
                match action {
                    Some(a) => self.apply(&a, Dispatch::Commit),
                    None => false,
                }
            }
        }
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Save => "save",
        ShortcutAction::TogglePreview => "togglePreview",
        ShortcutAction::SendBackward => "sendBackward",
        ShortcutAction::BringForward => "bringForward",
        ShortcutAction::SendToBack => "sendToBack",
        ShortcutAction::BringToFront => "bringToFront",
        ShortcutAction::ReorderUp => "reorderUp",
        ShortcutAction::ReorderDown => "reorderDown",
        ShortcutAction::Nudge(_) => "move",
    }
}

/// Host clock. Only differences between readings matter.
fn now() -> Duration {
    #[cfg(target_arch = "wasm32")]
    {
        Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("page builder WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Compile a placement intent (JSON) to style declarations.
/// Returns JSON `{"ok":true,"style":{...},"css":"..."}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn compile_block_style(intent_json: &str) -> String {
    match serde_json::from_str::<PlacementIntent>(intent_json) {
        Ok(intent) => {
            let style = compute_block_style(&intent);
            serde_json::json!({ "ok": true, "style": style, "css": style.to_css() }).to_string()
        }
        Err(e) => error_json(&e.to_string()),
    }
}

/// Decorate a component tree for one viewport.
/// Returns JSON `{"ok":true,"nodes":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn decorate_tree_json(tree_json: &str, editor_json: &str, viewport: &str) -> String {
    let parsed = (|| -> Result<_, String> {
        let nodes: Vec<Component> = serde_json::from_str(tree_json).map_err(|e| e.to_string())?;
        let editor: EditorMap = if editor_json.trim().is_empty() {
            EditorMap::new()
        } else {
            serde_json::from_str(editor_json).map_err(|e| e.to_string())?
        };
        let viewport: Viewport = viewport.parse()?;
        Ok(decorate_tree(&nodes, &editor, viewport))
    })();
    match parsed {
        Ok(nodes) => serde_json::json!({ "ok": true, "nodes": nodes }).to_string(),
        Err(e) => error_json(&e),
    }
}

/// Convert a CSS length for the layout panel's unit switch, e.g.
/// `convert_length("100px", "%", 400.0)` → `"25%"`. `parent_px` is the
/// containing block size along the axis (0 if unknown). Returns an empty
/// string for unparseable input.
#[wasm_bindgen]
pub fn convert_length(value: &str, unit: &str, parent_px: f64) -> String {
    let to = match unit {
        "px" => Unit::Px,
        "%" => Unit::Percent,
        "rem" => Unit::Rem,
        _ => return String::new(),
    };
    let ctx = UnitContext {
        parent_px,
        ..UnitContext::default()
    };
    Length::parse(value)
        .map(|l| l.convert(to, ctx).to_string())
        .unwrap_or_default()
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "ok": false, "error": message }).to_string()
}
