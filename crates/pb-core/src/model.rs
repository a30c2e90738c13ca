//! Core data model for page builder documents.
//!
//! A page is an ordered list of root `Component`s, each of which may own
//! children. Layout attributes live directly on the component (with optional
//! per-viewport variants such as `widthMobile`), while editor-only metadata
//! (display names, locks, visibility, z-index overrides) lives in a separate
//! `EditorMap` keyed by `ComponentId`, so the tree and the editor state can be
//! versioned independently.

use crate::id::ComponentId;
use crate::length::Length;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ─── Viewport ────────────────────────────────────────────────────────────

/// One of the three responsive breakpoints an editor can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Viewport::Desktop, Viewport::Tablet, Viewport::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            Viewport::Desktop => "desktop",
            Viewport::Tablet => "tablet",
            Viewport::Mobile => "mobile",
        }
    }

    /// Suffix used by viewport-qualified attribute names (`widthDesktop`).
    pub fn suffix(self) -> &'static str {
        match self {
            Viewport::Desktop => "Desktop",
            Viewport::Tablet => "Tablet",
            Viewport::Mobile => "Mobile",
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Viewport::Desktop),
            "tablet" => Ok(Viewport::Tablet),
            "mobile" => Ok(Viewport::Mobile),
            other => Err(format!("unknown viewport `{other}`")),
        }
    }
}

// ─── Placement enums ─────────────────────────────────────────────────────

/// CSS position mode supported by the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Relative,
    Absolute,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Relative => "relative",
            Position::Absolute => "absolute",
        }
    }
}

/// Horizontal docking of an absolutely positioned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockX {
    Left,
    Center,
    Right,
}

/// Vertical docking of an absolutely positioned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockY {
    Top,
    Center,
    Bottom,
}

/// How a block reacts when its container shrinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponsiveBehavior {
    #[default]
    None,
    /// Keep the authored aspect ratio and fill the container width.
    ScaleProportional,
}

/// Free transform applied on top of layout: translation in px plus scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

// ─── CSS values ──────────────────────────────────────────────────────────

/// A layout value as authored: either a bare number (px) or a CSS string
/// such as `"200px"`, `"50%"`, or `"auto"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Text(String),
}

impl CssValue {
    /// Pixel amount of this value, if it is numeric or px-valued.
    pub fn as_px(&self) -> Option<f64> {
        match self {
            CssValue::Number(n) => Some(*n),
            CssValue::Text(s) => Length::parse(s).ok().and_then(|l| l.as_px()),
        }
    }

    /// Leading numeric amount regardless of unit (`"200px"` → 200).
    pub fn numeric(&self) -> Option<f64> {
        match self {
            CssValue::Number(n) => Some(*n),
            CssValue::Text(s) => Length::parse(s).ok().map(|l| l.value),
        }
    }

    pub fn px(n: f64) -> Self {
        CssValue::Text(format!("{}px", n.round()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CssValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CssValue::Number(n) => write!(f, "{n}px"),
            CssValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CssValue {
    fn from(s: &str) -> Self {
        CssValue::Text(s.to_string())
    }
}

impl From<f64> for CssValue {
    fn from(n: f64) -> Self {
        CssValue::Number(n)
    }
}

// ─── Layout keys ─────────────────────────────────────────────────────────

/// A layout attribute that can be overridden per viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Width,
    Height,
    Top,
    Left,
    Margin,
    Padding,
}

impl Dimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
            Dimension::Top => "top",
            Dimension::Left => "left",
            Dimension::Margin => "margin",
            Dimension::Padding => "padding",
        }
    }
}

/// Typed attribute name such as `width` or `heightMobile`.
///
/// Resize actions are keyed by these, so the same interaction logic can edit
/// any viewport's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayoutKey {
    pub dimension: Dimension,
    pub viewport: Option<Viewport>,
}

impl LayoutKey {
    pub const fn base(dimension: Dimension) -> Self {
        Self {
            dimension,
            viewport: None,
        }
    }

    pub const fn for_viewport(dimension: Dimension, viewport: Viewport) -> Self {
        Self {
            dimension,
            viewport: Some(viewport),
        }
    }
}

impl fmt::Display for LayoutKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dimension.as_str())?;
        if let Some(vp) = self.viewport {
            f.write_str(vp.suffix())?;
        }
        Ok(())
    }
}

impl FromStr for LayoutKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const DIMENSIONS: [Dimension; 6] = [
            Dimension::Width,
            Dimension::Height,
            Dimension::Top,
            Dimension::Left,
            Dimension::Margin,
            Dimension::Padding,
        ];
        for dimension in DIMENSIONS {
            let Some(rest) = s.strip_prefix(dimension.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                return Ok(Self::base(dimension));
            }
            if let Some(vp) = Viewport::ALL.into_iter().find(|vp| vp.suffix() == rest) {
                return Ok(Self::for_viewport(dimension, vp));
            }
        }
        Err(format!("unknown layout attribute `{s}`"))
    }
}

impl TryFrom<String> for LayoutKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayoutKey> for String {
    fn from(key: LayoutKey) -> Self {
        key.to_string()
    }
}

// ─── Layout attributes ───────────────────────────────────────────────────

/// Layout attributes of a component. Every per-viewport attribute has a base
/// value and optional desktop/tablet/mobile overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_desktop: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_tablet: Option<CssValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_mobile: Option<CssValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dock_x: Option<DockX>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dock_y: Option<DockY>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive_behavior: Option<ResponsiveBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

impl LayoutProps {
    /// The raw value stored under `key` (no fallback).
    pub fn get(&self, key: LayoutKey) -> Option<&CssValue> {
        use Dimension::*;
        use Viewport::*;
        match (key.dimension, key.viewport) {
            (Width, None) => self.width.as_ref(),
            (Width, Some(Desktop)) => self.width_desktop.as_ref(),
            (Width, Some(Tablet)) => self.width_tablet.as_ref(),
            (Width, Some(Mobile)) => self.width_mobile.as_ref(),
            (Height, None) => self.height.as_ref(),
            (Height, Some(Desktop)) => self.height_desktop.as_ref(),
            (Height, Some(Tablet)) => self.height_tablet.as_ref(),
            (Height, Some(Mobile)) => self.height_mobile.as_ref(),
            (Top, None) => self.top.as_ref(),
            (Top, Some(Desktop)) => self.top_desktop.as_ref(),
            (Top, Some(Tablet)) => self.top_tablet.as_ref(),
            (Top, Some(Mobile)) => self.top_mobile.as_ref(),
            (Left, None) => self.left.as_ref(),
            (Left, Some(Desktop)) => self.left_desktop.as_ref(),
            (Left, Some(Tablet)) => self.left_tablet.as_ref(),
            (Left, Some(Mobile)) => self.left_mobile.as_ref(),
            (Margin, None) => self.margin.as_ref(),
            (Margin, Some(Desktop)) => self.margin_desktop.as_ref(),
            (Margin, Some(Tablet)) => self.margin_tablet.as_ref(),
            (Margin, Some(Mobile)) => self.margin_mobile.as_ref(),
            (Padding, None) => self.padding.as_ref(),
            (Padding, Some(Desktop)) => self.padding_desktop.as_ref(),
            (Padding, Some(Tablet)) => self.padding_tablet.as_ref(),
            (Padding, Some(Mobile)) => self.padding_mobile.as_ref(),
        }
    }

    /// Mutable slot for `key`.
    pub fn slot_mut(&mut self, key: LayoutKey) -> &mut Option<CssValue> {
        use Dimension::*;
        use Viewport::*;
        match (key.dimension, key.viewport) {
            (Width, None) => &mut self.width,
            (Width, Some(Desktop)) => &mut self.width_desktop,
            (Width, Some(Tablet)) => &mut self.width_tablet,
            (Width, Some(Mobile)) => &mut self.width_mobile,
            (Height, None) => &mut self.height,
            (Height, Some(Desktop)) => &mut self.height_desktop,
            (Height, Some(Tablet)) => &mut self.height_tablet,
            (Height, Some(Mobile)) => &mut self.height_mobile,
            (Top, None) => &mut self.top,
            (Top, Some(Desktop)) => &mut self.top_desktop,
            (Top, Some(Tablet)) => &mut self.top_tablet,
            (Top, Some(Mobile)) => &mut self.top_mobile,
            (Left, None) => &mut self.left,
            (Left, Some(Desktop)) => &mut self.left_desktop,
            (Left, Some(Tablet)) => &mut self.left_tablet,
            (Left, Some(Mobile)) => &mut self.left_mobile,
            (Margin, None) => &mut self.margin,
            (Margin, Some(Desktop)) => &mut self.margin_desktop,
            (Margin, Some(Tablet)) => &mut self.margin_tablet,
            (Margin, Some(Mobile)) => &mut self.margin_mobile,
            (Padding, None) => &mut self.padding,
            (Padding, Some(Desktop)) => &mut self.padding_desktop,
            (Padding, Some(Tablet)) => &mut self.padding_tablet,
            (Padding, Some(Mobile)) => &mut self.padding_mobile,
        }
    }

    /// Set `key` to `value`. An empty string clears the attribute, matching
    /// how the layout panel removes an override.
    pub fn set(&mut self, key: LayoutKey, value: CssValue) {
        let slot = self.slot_mut(key);
        *slot = if value.is_empty() { None } else { Some(value) };
    }

    /// Effective value for `dimension` in `viewport`: the viewport override
    /// if present, else the base attribute.
    pub fn resolve(&self, dimension: Dimension, viewport: Viewport) -> Option<&CssValue> {
        self.get(LayoutKey::for_viewport(dimension, viewport))
            .or_else(|| self.get(LayoutKey::base(dimension)))
    }
}

// ─── Components ──────────────────────────────────────────────────────────

/// A node in the page tree.
///
/// `kind` is the renderer tag (`"Section"`, `"Image"`, ...) and is opaque to
/// the engine. Attributes the engine does not model are kept in `extra` and
/// round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Component>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(flatten)]
    pub layout: LayoutProps,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Component {
    pub fn new(id: ComponentId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            children: None,
            name: None,
            hidden: None,
            locked: None,
            layout: LayoutProps::default(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Component>) -> Self {
        self.children = Some(children);
        self
    }

    pub fn children(&self) -> &[Component] {
        self.children.as_deref().unwrap_or(&[])
    }
}

// ─── Editor metadata ─────────────────────────────────────────────────────

/// Per-viewport ordering of a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackStrategy {
    #[default]
    Default,
    Reverse,
    /// Children sorted by their own `order<Viewport>` editor flag.
    Custom,
}

/// Editor-only metadata for one component. Every field is optional: an
/// unset field means "inherit the component's own value". The same type is
/// used as a patch for `update-editor`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    /// Viewports in which the component is suppressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<SmallVec<[Viewport; 3]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_desktop: Option<StackStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_tablet: Option<StackStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_mobile: Option<StackStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_desktop: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_tablet: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_mobile: Option<i32>,
}

impl EditorFlags {
    /// Overlay every field set in `patch` onto `self`.
    pub fn merge(&mut self, patch: EditorFlags) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.locked.is_some() {
            self.locked = patch.locked;
        }
        if patch.z_index.is_some() {
            self.z_index = patch.z_index;
        }
        if patch.hidden.is_some() {
            self.hidden = patch.hidden;
        }
        if patch.stack_desktop.is_some() {
            self.stack_desktop = patch.stack_desktop;
        }
        if patch.stack_tablet.is_some() {
            self.stack_tablet = patch.stack_tablet;
        }
        if patch.stack_mobile.is_some() {
            self.stack_mobile = patch.stack_mobile;
        }
        if patch.order_desktop.is_some() {
            self.order_desktop = patch.order_desktop;
        }
        if patch.order_tablet.is_some() {
            self.order_tablet = patch.order_tablet;
        }
        if patch.order_mobile.is_some() {
            self.order_mobile = patch.order_mobile;
        }
    }

    pub fn is_hidden_in(&self, viewport: Viewport) -> bool {
        self.hidden
            .as_ref()
            .is_some_and(|list| list.contains(&viewport))
    }

    pub fn stack_for(&self, viewport: Viewport) -> StackStrategy {
        match viewport {
            Viewport::Desktop => self.stack_desktop,
            Viewport::Tablet => self.stack_tablet,
            Viewport::Mobile => self.stack_mobile,
        }
        .unwrap_or_default()
    }

    pub fn order_for(&self, viewport: Viewport) -> Option<i32> {
        match viewport {
            Viewport::Desktop => self.order_desktop,
            Viewport::Tablet => self.order_tablet,
            Viewport::Mobile => self.order_mobile,
        }
    }
}

/// Editor metadata for every component that has any, keyed by ID.
pub type EditorMap = HashMap<ComponentId, EditorFlags>;
