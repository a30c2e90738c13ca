//! Resize interactions: pointer drags on a resize handle and arrow-key
//! nudging.
//!
//! Both paths read the starting size from the live element (or the rendered
//! style, for keyboard nudges) rather than from stored attributes, and both
//! emit the same `resize` action keyed by the caller's viewport-qualified
//! width/height attributes.

use crate::input::{ArrowKey, InputEvent};
use crate::reducer::Action;
use crate::session::Dispatch;
use pb_core::{ComponentId, Dimension, LayoutKey, StyleDescriptor, Viewport};
use std::time::Duration;

// ─── Host capabilities ───────────────────────────────────────────────────

/// Live layout measurement of an element.
pub trait ElementMetrics {
    /// Rendered `(width, height)` in px, border box.
    fn offset_size(&self) -> (f64, f64);
}

/// Pointer capture on an element. Headless hosts report `is_supported()
/// == false` and the controller skips capture entirely.
pub trait PointerCapture {
    fn is_supported(&self) -> bool;
    fn capture(&self, pointer_id: i32);
    fn release(&self, pointer_id: i32);
}

// ─── Sessions ────────────────────────────────────────────────────────────

/// Which component is being resized and which attributes receive the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeTarget {
    pub id: ComponentId,
    pub width_key: LayoutKey,
    pub height_key: LayoutKey,
    pub viewport: Viewport,
}

impl ResizeTarget {
    /// Target editing `width<Viewport>` / `height<Viewport>`.
    pub fn for_viewport(id: ComponentId, viewport: Viewport) -> Self {
        Self {
            id,
            width_key: LayoutKey::for_viewport(Dimension::Width, viewport),
            height_key: LayoutKey::for_viewport(Dimension::Height, viewport),
            viewport,
        }
    }

    fn action(&self, width: f64, height: f64) -> Action {
        Action::resize(self.id, [(self.width_key, width), (self.height_key, height)])
    }
}

/// State of one pointer drag, from pointer-down to pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub target: ResizeTarget,
    pub start_x: f64,
    pub start_y: f64,
    pub start_width: f64,
    pub start_height: f64,
    /// Grid increment in px; sizes snap to multiples of it. `0` disables
    /// snapping.
    pub snap: f64,
    pub pointer_id: i32,
    /// Whether pointer capture was acquired and must be released.
    pub captured: bool,
    last: Option<(f64, f64)>,
}

impl ResizeSession {
    /// Size for a pointer at `(x, y)`: start size plus cursor delta,
    /// snapped and never below 1px.
    pub fn size_at(&self, x: f64, y: f64) -> (f64, f64) {
        (
            snap_size(self.start_width + (x - self.start_x), self.snap),
            snap_size(self.start_height + (y - self.start_y), self.snap),
        )
    }
}

fn snap_size(value: f64, increment: f64) -> f64 {
    let snapped = if increment > 0.0 {
        (value / increment).round() * increment
    } else {
        value
    };
    let rounded = snapped.round();
    if rounded.is_finite() { rounded.max(1.0) } else { 1.0 }
}

/// Drives pointer resize sessions.
#[derive(Debug, Default)]
pub struct ResizeController {
    session: Option<ResizeSession>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a drag on `element`'s resize handle. Measures the element and
    /// captures the pointer when the host supports it. A session already in
    /// progress is ended first.
    pub fn pointer_down<E>(
        &mut self,
        target: ResizeTarget,
        x: f64,
        y: f64,
        pointer_id: i32,
        snap: f64,
        element: &E,
    ) where
        E: ElementMetrics + PointerCapture + ?Sized,
    {
        self.cancel(element);
        let (start_width, start_height) = element.offset_size();
        let captured = element.is_supported();
        if captured {
            element.capture(pointer_id);
        }
        log::debug!(
            "resize: start {} at {start_width}x{start_height} (capture: {captured})",
            target.id
        );
        self.session = Some(ResizeSession {
            target,
            start_x: x,
            start_y: y,
            start_width,
            start_height,
            snap,
            pointer_id,
            captured,
            last: None,
        });
    }

    /// Live size for the current pointer position. Emits nothing when no
    /// session is active, the pointer is a different one, or the snapped
    /// size did not change.
    pub fn pointer_move(&mut self, x: f64, y: f64, pointer_id: i32) -> Option<Action> {
        let session = self.session.as_mut()?;
        if session.pointer_id != pointer_id {
            return None;
        }
        let size = session.size_at(x, y);
        let previous = session.last.unwrap_or((session.start_width, session.start_height));
        if size == previous {
            return None;
        }
        session.last = Some(size);
        log::trace!("resize: {} -> {}x{}", session.target.id, size.0, size.1);
        Some(session.target.action(size.0, size.1))
    }

    /// End the drag. Returns the final size as the action to commit, or
    /// `None` if the drag ended at its start size.
    pub fn pointer_up<E>(&mut self, x: f64, y: f64, pointer_id: i32, element: &E) -> Option<Action>
    where
        E: PointerCapture + ?Sized,
    {
        if self.session.as_ref()?.pointer_id != pointer_id {
            return None;
        }
        let session = self.end(element)?;
        let size = session.size_at(x, y);
        if size == (session.start_width, session.start_height) {
            return None;
        }
        Some(session.target.action(size.0, size.1))
    }

    /// Abandon the drag (pointer cancel or the handle going away). Returns
    /// `true` if a session was active.
    pub fn cancel<E>(&mut self, element: &E) -> bool
    where
        E: PointerCapture + ?Sized,
    {
        self.end(element).is_some()
    }

    /// Route a pointer event. Moves preview, the release commits.
    pub fn handle<E>(&mut self, event: &InputEvent, element: &E) -> Option<(Action, Dispatch)>
    where
        E: PointerCapture + ?Sized,
    {
        match *event {
            InputEvent::PointerMove { x, y, pointer_id } => {
                self.pointer_move(x, y, pointer_id).map(|a| (a, Dispatch::Preview))
            }
            InputEvent::PointerUp { x, y, pointer_id } => {
                self.pointer_up(x, y, pointer_id, element).map(|a| (a, Dispatch::Commit))
            }
            InputEvent::PointerCancel { pointer_id } => {
                if self.session.as_ref().is_some_and(|s| s.pointer_id == pointer_id) {
                    self.cancel(element);
                }
                None
            }
            InputEvent::PointerDown { .. } => None,
        }
    }

    fn end<E>(&mut self, element: &E) -> Option<ResizeSession>
    where
        E: PointerCapture + ?Sized,
    {
        let session = self.session.take()?;
        if session.captured {
            element.release(session.pointer_id);
        }
        Some(session)
    }
}

// ─── Keyboard nudging ────────────────────────────────────────────────────

/// Keyboard nudge settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NudgeConfig {
    /// Size change per key press, in px.
    pub step: f64,
    /// How long the size readout stays up after the last nudge.
    pub overlay: Duration,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            overlay: Duration::from_millis(300),
        }
    }
}

/// Resizes the selected block with arrow keys. Left/right change the
/// width, up/down the height.
///
/// Timestamps are host clock readings (e.g. `performance.now()`), so the
/// nudger works without a runtime.
#[derive(Debug, Clone, Default)]
pub struct KeyboardNudger {
    pub config: NudgeConfig,
    disabled: bool,
    overlay_until: Option<Duration>,
}

impl KeyboardNudger {
    pub fn new(config: NudgeConfig) -> Self {
        Self {
            config,
            disabled: false,
            overlay_until: None,
        }
    }

    /// Disable nudging, e.g. while the target is locked.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.overlay_until = None;
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Nudge `target` one step in `key`'s direction.
    ///
    /// Starting sizes come from `rendered` when pixel-valued, else from the
    /// live element. Returns `None` when disabled.
    pub fn nudge<M>(
        &mut self,
        target: &ResizeTarget,
        key: ArrowKey,
        rendered: &StyleDescriptor,
        element: &M,
        now: Duration,
    ) -> Option<Action>
    where
        M: ElementMetrics + ?Sized,
    {
        if self.disabled {
            return None;
        }
        let (measured_w, measured_h) = element.offset_size();
        let mut width = rendered.width.as_ref().and_then(|v| v.as_px()).unwrap_or(measured_w);
        let mut height = rendered.height.as_ref().and_then(|v| v.as_px()).unwrap_or(measured_h);

        let delta = key.sign() * self.config.step;
        if key.is_horizontal() {
            width = (width + delta).round().max(1.0);
        } else {
            height = (height + delta).round().max(1.0);
        }
        self.overlay_until = Some(now + self.config.overlay);
        Some(target.action(width, height))
    }

    /// Whether the size readout should be visible at `now`.
    pub fn overlay_visible(&self, now: Duration) -> bool {
        self.overlay_until.is_some_and(|until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::CssValue;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct FakeElement {
        size: (f64, f64),
        supported: bool,
        log: RefCell<Vec<String>>,
    }

    impl ElementMetrics for FakeElement {
        fn offset_size(&self) -> (f64, f64) {
            self.size
        }
    }

    impl PointerCapture for FakeElement {
        fn is_supported(&self) -> bool {
            self.supported
        }
        fn capture(&self, pointer_id: i32) {
            self.log.borrow_mut().push(format!("capture {pointer_id}"));
        }
        fn release(&self, pointer_id: i32) {
            self.log.borrow_mut().push(format!("release {pointer_id}"));
        }
    }

    fn target() -> ResizeTarget {
        ResizeTarget::for_viewport(ComponentId::intern("rz_box"), Viewport::Desktop)
    }

    fn sizes(action: &Action) -> BTreeMap<String, String> {
        let Action::Resize { values, .. } = action else {
            panic!("expected resize, got {action:?}");
        };
        values.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn drag_emits_viewport_keys_and_commits_on_release() {
        let el = FakeElement {
            size: (200.0, 100.0),
            supported: true,
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 10.0, 10.0, 7, 0.0, &el);
        let live = ctl.pointer_move(40.0, 30.0, 7).unwrap();
        assert_eq!(sizes(&live)["widthDesktop"], "230px");
        assert_eq!(sizes(&live)["heightDesktop"], "120px");

        let (done, mode) = ctl
            .handle(
                &InputEvent::PointerUp {
                    x: 50.0,
                    y: 30.0,
                    pointer_id: 7,
                },
                &el,
            )
            .unwrap();
        assert_eq!(mode, Dispatch::Commit);
        assert_eq!(sizes(&done)["widthDesktop"], "240px");
        assert!(!ctl.is_active());
        assert_eq!(*el.log.borrow(), vec!["capture 7", "release 7"]);
    }

    #[test]
    fn size_never_drops_below_one() {
        let el = FakeElement {
            size: (20.0, 20.0),
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 100.0, 100.0, 1, 0.0, &el);
        let action = ctl.pointer_move(-500.0, 60.0, 1).unwrap();
        assert_eq!(sizes(&action)["widthDesktop"], "1px");
        assert_eq!(sizes(&action)["heightDesktop"], "1px");
    }

    #[test]
    fn snaps_to_grid_increment() {
        let el = FakeElement {
            size: (100.0, 50.0),
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 0.0, 0.0, 1, 25.0, &el);
        let action = ctl.pointer_move(37.0, 0.0, 1).unwrap();
        assert_eq!(sizes(&action)["widthDesktop"], "125px");
        assert_eq!(sizes(&action)["heightDesktop"], "50px");
        // Still inside the same grid cell: nothing new to render.
        assert!(ctl.pointer_move(30.0, 0.0, 1).is_none());
    }

    #[test]
    fn missing_capture_api_is_skipped() {
        let el = FakeElement {
            size: (10.0, 10.0),
            supported: false,
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 0.0, 0.0, 3, 0.0, &el);
        assert!(ctl.pointer_move(5.0, 5.0, 3).is_some());
        assert!(ctl.pointer_up(5.0, 5.0, 3, &el).is_some());
        assert!(el.log.borrow().is_empty());
    }

    #[test]
    fn cancel_releases_capture_without_action() {
        let el = FakeElement {
            size: (10.0, 10.0),
            supported: true,
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 0.0, 0.0, 2, 0.0, &el);
        ctl.pointer_move(5.0, 5.0, 2);
        assert!(ctl.handle(&InputEvent::PointerCancel { pointer_id: 2 }, &el).is_none());
        assert!(!ctl.is_active());
        assert_eq!(*el.log.borrow(), vec!["capture 2", "release 2"]);
    }

    #[test]
    fn click_without_drag_commits_nothing() {
        let el = FakeElement {
            size: (10.0, 10.0),
            ..Default::default()
        };
        let mut ctl = ResizeController::new();
        ctl.pointer_down(target(), 4.0, 4.0, 1, 0.0, &el);
        assert!(ctl.pointer_up(4.0, 4.0, 1, &el).is_none());
    }

    #[test]
    fn nudge_prefers_pixel_style_then_measurement() {
        let el = FakeElement {
            size: (80.0, 40.0),
            ..Default::default()
        };
        let mut nudger = KeyboardNudger::default();
        let style = StyleDescriptor {
            width: Some(CssValue::from("120px")),
            height: Some(CssValue::from("auto")),
            ..Default::default()
        };
        let now = Duration::from_millis(1_000);
        let action = nudger.nudge(&target(), ArrowKey::Right, &style, &el, now).unwrap();
        assert_eq!(sizes(&action)["widthDesktop"], "121px");
        assert_eq!(sizes(&action)["heightDesktop"], "40px");

        let action = nudger.nudge(&target(), ArrowKey::Up, &style, &el, now).unwrap();
        assert_eq!(sizes(&action)["heightDesktop"], "39px");
    }

    #[test]
    fn nudge_overlay_expires() {
        let el = FakeElement {
            size: (1.0, 1.0),
            ..Default::default()
        };
        let mut nudger = KeyboardNudger::default();
        let t0 = Duration::from_secs(5);
        let action = nudger
            .nudge(&target(), ArrowKey::Left, &StyleDescriptor::default(), &el, t0)
            .unwrap();
        assert_eq!(sizes(&action)["widthDesktop"], "1px");
        assert!(nudger.overlay_visible(t0 + Duration::from_millis(299)));
        assert!(!nudger.overlay_visible(t0 + Duration::from_millis(300)));
    }

    #[test]
    fn disabled_nudger_is_inert() {
        let el = FakeElement::default();
        let mut nudger = KeyboardNudger::default();
        nudger.set_disabled(true);
        let now = Duration::ZERO;
        assert!(
            nudger
                .nudge(&target(), ArrowKey::Down, &StyleDescriptor::default(), &el, now)
                .is_none()
        );
        assert!(!nudger.overlay_visible(now));
    }
}
