//! CSS length values (`12px`, `50%`, `1.5rem`) and unit conversion.
//!
//! Parsed with `winnow`. A bare number is read as pixels, which is how the
//! canvas stores values typed without a unit.

use std::fmt;
use winnow::combinator::{alt, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Length unit understood by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Px,
    Percent,
    Rem,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Rem => "rem",
        }
    }
}

/// A numeric length with a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

/// Sizes needed to convert between relative and absolute units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitContext {
    /// Computed font size of the document root, in px.
    pub root_font_px: f64,
    /// Size of the containing block along the converted axis, in px.
    /// Zero means "unknown": percentages are then treated as raw numbers.
    pub parent_px: f64,
}

impl Default for UnitContext {
    fn default() -> Self {
        Self {
            root_font_px: 16.0,
            parent_px: 0.0,
        }
    }
}

impl Length {
    pub const fn px(value: f64) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    /// Parse a CSS length. Surrounding whitespace is ignored.
    ///
    /// # Errors
    /// Returns a message if the text is not a number followed by an optional
    /// `px`, `%` or `rem` unit.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut rest = text.trim();
        let length = parse_length
            .parse_next(&mut rest)
            .map_err(|e| format!("invalid length `{text}`: {e}"))?;
        if !rest.is_empty() {
            return Err(format!("invalid length `{text}`: trailing `{rest}`"));
        }
        Ok(length)
    }

    /// Pixel value, if this length is absolute.
    pub fn as_px(&self) -> Option<f64> {
        (self.unit == Unit::Px).then_some(self.value)
    }

    /// Convert to `to`, going through pixels. The result is rounded to a
    /// whole number, as the layout panel displays it.
    pub fn convert(self, to: Unit, ctx: UnitContext) -> Length {
        if self.unit == to {
            return self;
        }
        let px = match self.unit {
            Unit::Px => self.value,
            Unit::Percent if ctx.parent_px > 0.0 => self.value / 100.0 * ctx.parent_px,
            Unit::Percent => self.value,
            Unit::Rem => self.value * ctx.root_font_px,
        };
        let value = match to {
            Unit::Px => px,
            Unit::Percent if ctx.parent_px > 0.0 => px / ctx.parent_px * 100.0,
            Unit::Percent => px,
            Unit::Rem if ctx.root_font_px > 0.0 => px / ctx.root_font_px,
            Unit::Rem => px,
        };
        let value = if value.is_finite() { value.round() } else { 0.0 };
        Length { value, unit: to }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_str())
    }
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let int_part: &str =
        take_while::<_, _, ErrMode<ContextError>>(0.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut frac_len = 0;
    if input.starts_with('.') {
        *input = &input[1..];
        let frac: &str = take_while::<_, _, ErrMode<ContextError>>(0.., |c: char| c.is_ascii_digit())
            .parse_next(input)?;
        frac_len = frac.len();
    }
    if int_part.is_empty() && frac_len == 0 {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

fn parse_unit(input: &mut &str) -> ModalResult<Unit> {
    alt((
        "px".value(Unit::Px),
        "%".value(Unit::Percent),
        "rem".value(Unit::Rem),
    ))
    .parse_next(input)
}

fn parse_length(input: &mut &str) -> ModalResult<Length> {
    let value = parse_number(input)?;
    let unit = opt(parse_unit).parse_next(input)?.unwrap_or_default();
    Ok(Length { value, unit })
}
