//! DOM-backed implementations of the editor's host capabilities.

use pb_editor::placement::Rect;
use pb_editor::resize::{ElementMetrics, PointerCapture};
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

/// A live block element on the canvas.
#[derive(Debug, Clone)]
pub struct DomElement(pub HtmlElement);

impl DomElement {
    /// Client rectangle of the element.
    pub fn rect(&self) -> Rect {
        to_rect(&self.0.get_bounding_client_rect())
    }

    /// Client rectangle of the element's parent, if attached.
    pub fn parent_rect(&self) -> Option<Rect> {
        self.0
            .parent_element()
            .map(|p| to_rect(&p.get_bounding_client_rect()))
    }
}

fn to_rect(r: &web_sys::DomRect) -> Rect {
    Rect {
        left: r.left(),
        top: r.top(),
        right: r.right(),
        bottom: r.bottom(),
    }
}

impl ElementMetrics for DomElement {
    fn offset_size(&self) -> (f64, f64) {
        (self.0.offset_width() as f64, self.0.offset_height() as f64)
    }
}

impl PointerCapture for DomElement {
    // jsdom and some embedded webviews ship elements without the capture API.
    fn is_supported(&self) -> bool {
        js_sys::Reflect::has(&self.0, &JsValue::from_str("setPointerCapture")).unwrap_or(false)
    }

    fn capture(&self, pointer_id: i32) {
        if let Err(e) = self.0.set_pointer_capture(pointer_id) {
            log::debug!("pointer capture failed: {e:?}");
        }
    }

    fn release(&self, pointer_id: i32) {
        if let Err(e) = self.0.release_pointer_capture(pointer_id) {
            log::debug!("pointer release failed: {e:?}");
        }
    }
}
