//! Block style compiler.
//!
//! Turns a `PlacementIntent` (what the author asked for: dock to center,
//! scale proportionally, translate by 10px) into a `StyleDescriptor` holding
//! concrete CSS declarations. Unset intent fields never appear in the output.

use crate::model::{
    Component, CssValue, Dimension, DockX, DockY, EditorMap, Position, ResponsiveBehavior,
    Transform, Viewport,
};
use serde::{Deserialize, Serialize};

/// High-level placement of one block, already resolved for a viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementIntent {
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub width: Option<CssValue>,
    #[serde(default)]
    pub height: Option<CssValue>,
    #[serde(default)]
    pub responsive_behavior: Option<ResponsiveBehavior>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub dock_x: Option<DockX>,
    #[serde(default)]
    pub dock_y: Option<DockY>,
    #[serde(default)]
    pub top: Option<CssValue>,
    #[serde(default)]
    pub left: Option<CssValue>,
    #[serde(default)]
    pub right: Option<CssValue>,
    #[serde(default)]
    pub bottom: Option<CssValue>,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub margin: Option<CssValue>,
    #[serde(default)]
    pub padding: Option<CssValue>,
    #[serde(default)]
    pub z_index: Option<i32>,
}

impl PlacementIntent {
    /// Collect the intent of `component` for `viewport`: viewport overrides
    /// win over base attributes, and an editor z-index wins over the
    /// component's own.
    pub fn for_component(component: &Component, editor: &EditorMap, viewport: Viewport) -> Self {
        let layout = &component.layout;
        let pick = |dim| layout.resolve(dim, viewport).cloned();
        Self {
            transform: layout.transform,
            width: pick(Dimension::Width),
            height: pick(Dimension::Height),
            responsive_behavior: layout.responsive_behavior,
            position: layout.position,
            dock_x: layout.dock_x,
            dock_y: layout.dock_y,
            top: pick(Dimension::Top),
            left: pick(Dimension::Left),
            right: layout.right.clone(),
            bottom: layout.bottom.clone(),
            container_type: layout.container_type.clone(),
            container_name: layout.container_name.clone(),
            margin: pick(Dimension::Margin),
            padding: pick(Dimension::Padding),
            z_index: editor
                .get(&component.id)
                .and_then(|f| f.z_index)
                .or(layout.z_index),
        }
    }
}

/// Concrete style declarations for a block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<CssValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl StyleDescriptor {
    /// `(css-property, value)` pairs in a stable order. The `margin`
    /// shorthand precedes the per-side margins so docking margins win.
    pub fn declarations(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        let mut push = |prop: &'static str, value: Option<String>| {
            if let Some(v) = value {
                out.push((prop, v));
            }
        };
        let css = |v: &Option<CssValue>| v.as_ref().map(ToString::to_string);

        push("position", self.position.map(|p| p.as_str().to_string()));
        push("top", css(&self.top));
        push("right", css(&self.right));
        push("bottom", css(&self.bottom));
        push("left", css(&self.left));
        push("width", css(&self.width));
        push("height", css(&self.height));
        push("aspect-ratio", self.aspect_ratio.clone());
        push("margin", css(&self.margin));
        push("margin-top", css(&self.margin_top));
        push("margin-right", css(&self.margin_right));
        push("margin-bottom", css(&self.margin_bottom));
        push("margin-left", css(&self.margin_left));
        push("padding", css(&self.padding));
        push("z-index", self.z_index.map(|z| z.to_string()));
        push("transform", self.transform.clone());
        push("container-type", self.container_type.clone());
        push("container-name", self.container_name.clone());
        out
    }

    /// Inline-style text, e.g. `width: 100%; aspect-ratio: 200 / 100`.
    pub fn to_css(&self) -> String {
        self.declarations()
            .into_iter()
            .map(|(prop, value)| format!("{prop}: {value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Compile a placement intent into concrete style declarations.
pub fn compute_block_style(intent: &PlacementIntent) -> StyleDescriptor {
    let mut style = StyleDescriptor {
        transform: intent.transform.as_ref().map(transform_css),
        position: intent.position,
        margin: intent.margin.clone(),
        padding: intent.padding.clone(),
        z_index: intent.z_index,
        container_type: intent.container_type.clone(),
        container_name: intent.container_name.clone(),
        ..Default::default()
    };

    apply_sizing(intent, &mut style);
    apply_offsets(intent, &mut style);
    style
}

fn transform_css(t: &Transform) -> String {
    format!(
        "translate3d({}px, {}px, 0) scale({}, {})",
        t.x, t.y, t.scale_x, t.scale_y
    )
}

fn apply_sizing(intent: &PlacementIntent, style: &mut StyleDescriptor) {
    if intent.responsive_behavior == Some(ResponsiveBehavior::ScaleProportional) {
        let w = intent.width.as_ref().and_then(CssValue::as_px);
        let h = intent.height.as_ref().and_then(CssValue::as_px);
        if let (Some(w), Some(h)) = (w, h) {
            style.aspect_ratio = Some(format!("{w} / {h}"));
            style.width = Some(CssValue::from("100%"));
            return;
        }
        log::debug!("scale-proportional needs numeric width and height; passing sizes through");
    }
    style.width = intent.width.clone();
    style.height = intent.height.clone();
}

fn apply_offsets(intent: &PlacementIntent, style: &mut StyleDescriptor) {
    if intent.position != Some(Position::Absolute) {
        style.top = intent.top.clone();
        style.left = intent.left.clone();
        style.right = intent.right.clone();
        style.bottom = intent.bottom.clone();
        return;
    }

    match intent.dock_x {
        Some(DockX::Center) => {
            style.left = Some(CssValue::Number(0.0));
            style.right = Some(CssValue::Number(0.0));
            style.margin_left = Some(CssValue::from("auto"));
            style.margin_right = Some(CssValue::from("auto"));
        }
        Some(DockX::Right) => style.right = intent.right.clone(),
        Some(DockX::Left) | None => {
            style.left = intent.left.clone();
            style.right = intent.right.clone();
        }
    }

    match intent.dock_y {
        Some(DockY::Center) => {
            style.top = Some(CssValue::Number(0.0));
            style.bottom = Some(CssValue::Number(0.0));
            style.margin_top = Some(CssValue::from("auto"));
            style.margin_bottom = Some(CssValue::from("auto"));
        }
        Some(DockY::Bottom) => style.bottom = intent.bottom.clone(),
        Some(DockY::Top) | None => {
            style.top = intent.top.clone();
            style.bottom = intent.bottom.clone();
        }
    }
}
