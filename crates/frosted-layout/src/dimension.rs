#![forbid(unsafe_code)]

//! Attribute token validation.
//!
//! Panel sizes are written as one of three token forms, matched
//! case-insensitively:
//!
//! | Token      | Meaning                                 |
//! |------------|-----------------------------------------|
//! | `auto`     | size to the measured content            |
//! | `<n>px`    | absolute CSS pixels                     |
//! | `<n>%`     | percentage of the viewport on that axis |
//!
//! A breakpoint spec is three tokens: `<threshold>px <width> <height>`.
//!
//! # Failure Modes
//!
//! Parsing never panics. Invalid tokens come back as [`DimensionError`];
//! invalid breakpoint specs as [`BreakpointSpecError`], which carries enough
//! context (entry text, offending value, position) to log and skip the entry.
//!
//! Range checking is left to callers: `-5px` is a valid token.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed width or height value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Dimension {
    /// Size to the content box.
    Auto,
    /// Absolute size in CSS pixels.
    Pixels(f64),
    /// Percentage of the viewport extent on the same axis.
    Percent(f64),
}

impl Dimension {
    #[inline]
    pub const fn is_auto(self) -> bool {
        matches!(self, Dimension::Auto)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Pixels(n) => write!(f, "{n}px"),
            Self::Percent(n) => write!(f, "{n}%"),
        }
    }
}

/// A token that is not a valid [`Dimension`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    /// Neither `auto` nor ending in `px` / `%`.
    UnknownUnit { token: String },
    /// Known unit, but the numeric part is empty or not a finite number.
    InvalidNumber { token: String },
}

impl fmt::Display for DimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownUnit { token } => {
                write!(f, "\"{token}\" is not auto and does not end in px or %")
            }
            Self::InvalidNumber { token } => write!(f, "\"{token}\" has no valid number"),
        }
    }
}

impl std::error::Error for DimensionError {}

/// A viewport-width threshold with override sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Threshold in CSS pixels, truncated toward zero.
    pub threshold_px: i32,
    pub width: Dimension,
    pub height: Dimension,
}

impl Breakpoint {
    #[must_use]
    pub const fn new(threshold_px: i32, width: Dimension, height: Dimension) -> Self {
        Self {
            threshold_px,
            width,
            height,
        }
    }
}

/// Why a single breakpoint entry was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointSpecError {
    /// The entry did not split into exactly three tokens.
    WrongArity { entry: String, found: usize },
    /// Token at `index` (0 = threshold, 1 = width, 2 = height) is invalid.
    InvalidValue {
        entry: String,
        value: String,
        index: usize,
    },
}

impl BreakpointSpecError {
    /// The raw entry text, tokens joined by single spaces.
    #[must_use]
    pub fn entry(&self) -> &str {
        match self {
            Self::WrongArity { entry, .. } | Self::InvalidValue { entry, .. } => entry,
        }
    }
}

impl fmt::Display for BreakpointSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongArity { entry, found } => {
                write!(f, "expected 3 values at breakpoint \"{entry}\", found {found}")
            }
            Self::InvalidValue {
                entry,
                value,
                index,
            } => write!(
                f,
                "invalid value \"{value}\" at breakpoint \"{entry}\", index {index}"
            ),
        }
    }
}

impl std::error::Error for BreakpointSpecError {}

/// Whether `s` is a non-empty, finite number.
///
/// Surrounding whitespace is ignored.
#[must_use]
pub fn is_numeric_token(s: &str) -> bool {
    parse_number(s).is_some()
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a size token.
pub fn parse_dimension(token: &str) -> Result<Dimension, DimensionError> {
    let lower = token.to_ascii_lowercase();
    if lower == "auto" {
        return Ok(Dimension::Auto);
    }

    let (number, make): (&str, fn(f64) -> Dimension) =
        if let Some(number) = lower.strip_suffix("px") {
            (number, Dimension::Pixels)
        } else if let Some(number) = lower.strip_suffix('%') {
            (number, Dimension::Percent)
        } else {
            return Err(DimensionError::UnknownUnit {
                token: token.to_string(),
            });
        };

    parse_number(number)
        .map(make)
        .ok_or_else(|| DimensionError::InvalidNumber {
            token: token.to_string(),
        })
}

/// Parse the `<threshold>px` token of a breakpoint spec.
fn parse_threshold(token: &str) -> Option<i32> {
    let lower = token.to_ascii_lowercase();
    let number = parse_number(lower.strip_suffix("px")?)?;
    Some(number.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

/// Validate one `[threshold, width, height]` breakpoint spec.
pub fn parse_breakpoint_spec<S: AsRef<str>>(tokens: &[S]) -> Result<Breakpoint, BreakpointSpecError> {
    let entry = tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    let [threshold, width, height] = tokens else {
        return Err(BreakpointSpecError::WrongArity {
            found: tokens.len(),
            entry,
        });
    };

    let invalid = |value: &str, index: usize| BreakpointSpecError::InvalidValue {
        entry: entry.clone(),
        value: value.to_string(),
        index,
    };

    let threshold_px = parse_threshold(threshold.as_ref())
        .ok_or_else(|| invalid(&threshold.as_ref().to_ascii_lowercase(), 0))?;
    let width = parse_dimension(width.as_ref()).map_err(|_| invalid(width.as_ref(), 1))?;
    let height = parse_dimension(height.as_ref()).map_err(|_| invalid(height.as_ref(), 2))?;

    Ok(Breakpoint::new(threshold_px, width, height))
}
