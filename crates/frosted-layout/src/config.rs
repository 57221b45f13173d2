#![forbid(unsafe_code)]

//! Panel configuration loading.
//!
//! [`load`] turns the raw attribute strings collected from the DOM
//! ([`RawAttributes`]) into an immutable [`PanelConfig`]. The config is
//! captured once; hosts that change attributes must load again.
//!
//! # Failure Modes
//!
//! - Hard failures ([`ConfigError`]): missing or malformed `panel-dimensions`,
//!   or an unknown `breakpoint-type`. The first one encountered aborts the
//!   load and the widget must not render.
//! - Soft failures ([`BreakpointSpecError`]): a malformed entry in
//!   `breakpoints`. The entry is logged and skipped; loading continues.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dimension::{
    Breakpoint, BreakpointSpecError, Dimension, parse_breakpoint_spec, parse_dimension,
};

/// Base `"<width> <height>"` of the panel. Required.
pub const PANEL_DIMENSIONS_ATTR: &str = "panel-dimensions";
/// Comma-separated `"<threshold>px <width> <height>"` entries.
pub const BREAKPOINTS_ATTR: &str = "breakpoints";
/// `min-width` (default) or `max-width`.
pub const BREAKPOINT_TYPE_ATTR: &str = "breakpoint-type";
/// Margin around the content box, in pixels.
pub const CONTENT_MARGIN_ATTR: &str = "content-margin";
/// Space kept above and below the panel, in pixels.
pub const SPACE_TOP_BOT_ATTR: &str = "space-top-bot";

/// Attribute values as read from the document, before validation.
///
/// Field names deserialize from the attribute names, so a host can also hand
/// the whole set over as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RawAttributes {
    pub panel_dimensions: Option<String>,
    pub breakpoints: Option<String>,
    pub breakpoint_type: Option<String>,
    pub content_margin: Option<String>,
    pub space_top_bot: Option<String>,
    pub image_width: Option<String>,
    pub image_height: Option<String>,
    pub image_source: Option<String>,
}

/// How breakpoint thresholds are compared against the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakpointMode {
    /// Active when the viewport is at least the threshold.
    #[default]
    MinWidth,
    /// Active when the viewport is at most the threshold.
    MaxWidth,
}

impl BreakpointMode {
    /// Parse `min-width` / `max-width`, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "min-width" => Some(Self::MinWidth),
            "max-width" => Some(Self::MaxWidth),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MinWidth => "min-width",
            Self::MaxWidth => "max-width",
        }
    }

    /// Whether a breakpoint at `threshold_px` applies to `viewport_width`.
    #[inline]
    #[must_use]
    pub fn matches(self, threshold_px: i32, viewport_width: f64) -> bool {
        let threshold = f64::from(threshold_px);
        match self {
            Self::MinWidth => viewport_width >= threshold,
            Self::MaxWidth => viewport_width <= threshold,
        }
    }
}

impl fmt::Display for BreakpointMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort breakpoints for `mode`: ascending for `min-width`, descending for
/// `max-width`. The sort is stable, so equal thresholds keep attribute order.
pub fn sort_breakpoints(breakpoints: &mut [Breakpoint], mode: BreakpointMode) {
    match mode {
        BreakpointMode::MinWidth => breakpoints.sort_by_key(|bp| bp.threshold_px),
        BreakpointMode::MaxWidth => {
            breakpoints.sort_by(|a, b| b.threshold_px.cmp(&a.threshold_px));
        }
    }
}

/// Validated, immutable panel configuration.
///
/// Breakpoints are always kept sorted for [`breakpoint_mode`](Self::breakpoint_mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelConfig {
    base_width: Dimension,
    base_height: Dimension,
    breakpoints: Vec<Breakpoint>,
    breakpoint_mode: BreakpointMode,
    content_margin_px: u32,
    vertical_padding_px: u32,
    image_width: Option<f64>,
    image_height: Option<f64>,
    image_source: Option<String>,
}

impl PanelConfig {
    /// Config with a base size and every optional setting at its default.
    #[must_use]
    pub fn new(base_width: Dimension, base_height: Dimension) -> Self {
        Self {
            base_width,
            base_height,
            breakpoints: Vec::new(),
            breakpoint_mode: BreakpointMode::default(),
            content_margin_px: 0,
            vertical_padding_px: 0,
            image_width: None,
            image_height: None,
            image_source: None,
        }
    }

    /// Set the breakpoint mode, re-sorting any breakpoints (builder pattern).
    #[must_use]
    pub fn with_breakpoint_mode(mut self, mode: BreakpointMode) -> Self {
        self.breakpoint_mode = mode;
        sort_breakpoints(&mut self.breakpoints, mode);
        self
    }

    /// Replace the breakpoints (builder pattern). They are sorted for the
    /// current mode.
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: impl IntoIterator<Item = Breakpoint>) -> Self {
        self.breakpoints = breakpoints.into_iter().collect();
        sort_breakpoints(&mut self.breakpoints, self.breakpoint_mode);
        self
    }

    #[must_use]
    pub fn with_content_margin(mut self, px: u32) -> Self {
        self.content_margin_px = px;
        self
    }

    #[must_use]
    pub fn with_vertical_padding(mut self, px: u32) -> Self {
        self.vertical_padding_px = px;
        self
    }

    #[must_use]
    pub fn with_image_size(mut self, width: f64, height: f64) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }

    #[must_use]
    pub fn with_image_source(mut self, source: impl Into<String>) -> Self {
        self.image_source = Some(source.into());
        self
    }

    #[inline]
    pub const fn base_width(&self) -> Dimension {
        self.base_width
    }

    #[inline]
    pub const fn base_height(&self) -> Dimension {
        self.base_height
    }

    /// Breakpoints in resolution order.
    #[inline]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    #[inline]
    pub const fn breakpoint_mode(&self) -> BreakpointMode {
        self.breakpoint_mode
    }

    #[inline]
    pub const fn content_margin_px(&self) -> u32 {
        self.content_margin_px
    }

    #[inline]
    pub const fn vertical_padding_px(&self) -> u32 {
        self.vertical_padding_px
    }

    /// Intrinsic image size, when both attributes were present and numeric.
    #[must_use]
    pub fn image_size(&self) -> Option<(f64, f64)> {
        self.image_width.zip(self.image_height)
    }

    #[inline]
    pub fn image_source(&self) -> Option<&str> {
        self.image_source.as_deref()
    }
}

/// A configuration problem that prevents the panel from rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required attribute is absent or empty.
    MissingAttribute { name: &'static str },
    /// An attribute has the wrong number of tokens.
    WrongArity {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// A size token failed validation.
    InvalidDimension { name: &'static str, value: String },
    /// `breakpoint-type` is neither `min-width` nor `max-width`.
    InvalidBreakpointType { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute { name } => {
                write!(f, "empty or missing required attribute \"{name}\"")
            }
            Self::WrongArity {
                name,
                expected,
                found,
            } => write!(
                f,
                "unexpected length {found} for \"{name}\" attribute, expected {expected}"
            ),
            Self::InvalidDimension { name, value } => {
                write!(f, "invalid value \"{value}\" for \"{name}\" attribute")
            }
            Self::InvalidBreakpointType { value } => write!(
                f,
                "invalid \"{BREAKPOINT_TYPE_ATTR}\" attribute \"{value}\", expected min-width or max-width"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A loaded config together with the breakpoint entries that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub config: PanelConfig,
    pub skipped: Vec<BreakpointSpecError>,
}

/// Load and validate a [`PanelConfig`].
pub fn load(raw: &RawAttributes) -> Result<PanelConfig, ConfigError> {
    load_with_diagnostics(raw).map(|report| report.config)
}

/// Like [`load`], also returning the skipped breakpoint entries.
pub fn load_with_diagnostics(raw: &RawAttributes) -> Result<LoadReport, ConfigError> {
    let (base_width, base_height) = parse_panel_dimensions(raw.panel_dimensions.as_deref())?;

    let breakpoint_mode = match non_empty(raw.breakpoint_type.as_deref()) {
        None => BreakpointMode::default(),
        Some(value) => BreakpointMode::parse(value).ok_or_else(|| {
            ConfigError::InvalidBreakpointType {
                value: value.to_string(),
            }
        })?,
    };

    let (breakpoints, skipped) = parse_breakpoints(raw.breakpoints.as_deref());

    let mut config = PanelConfig::new(base_width, base_height)
        .with_breakpoint_mode(breakpoint_mode)
        .with_breakpoints(breakpoints)
        .with_content_margin(pixel_count(CONTENT_MARGIN_ATTR, raw.content_margin.as_deref()))
        .with_vertical_padding(pixel_count(SPACE_TOP_BOT_ATTR, raw.space_top_bot.as_deref()));
    config.image_width = image_extent("width", raw.image_width.as_deref());
    config.image_height = image_extent("height", raw.image_height.as_deref());
    config.image_source = non_empty(raw.image_source.as_deref()).map(str::to_string);

    if config.image_size().is_none() {
        warn!("background image size unknown; pan and zoom will be skipped");
    }
    debug!(
        mode = %config.breakpoint_mode,
        breakpoints = config.breakpoints.len(),
        skipped = skipped.len(),
        "panel config loaded"
    );

    Ok(LoadReport { config, skipped })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_panel_dimensions(value: Option<&str>) -> Result<(Dimension, Dimension), ConfigError> {
    let name = PANEL_DIMENSIONS_ATTR;
    let value = non_empty(value).ok_or(ConfigError::MissingAttribute { name })?;

    let tokens: Vec<&str> = value.split_whitespace().collect();
    let [width, height] = tokens.as_slice() else {
        return Err(ConfigError::WrongArity {
            name,
            expected: 2,
            found: tokens.len(),
        });
    };

    let parse = |token: &str| {
        parse_dimension(token).map_err(|_| ConfigError::InvalidDimension {
            name,
            value: token.to_string(),
        })
    };
    Ok((parse(*width)?, parse(*height)?))
}

fn parse_breakpoints(value: Option<&str>) -> (Vec<Breakpoint>, Vec<BreakpointSpecError>) {
    let mut valid = Vec::new();
    let mut skipped = Vec::new();
    let Some(value) = non_empty(value) else {
        return (valid, skipped);
    };

    for entry in value.split(',') {
        let tokens: Vec<&str> = entry.split_whitespace().collect();
        match parse_breakpoint_spec(tokens.as_slice()) {
            Ok(bp) => valid.push(bp),
            Err(err) => {
                warn!(entry = err.entry(), "{err}; ignoring breakpoint");
                skipped.push(err);
            }
        }
    }
    (valid, skipped)
}

/// Parse a leading integer the way `parseInt` does: optional sign, then
/// digits, ignoring anything after them.
fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude = rest[..digits_end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Non-negative pixel count for `attr`, defaulting to 0.
fn pixel_count(attr: &str, value: Option<&str>) -> u32 {
    let Some(value) = non_empty(value) else {
        return 0;
    };
    match parse_leading_int(value) {
        Some(n) if n < 0 => {
            warn!(attr, value, "negative pixel count, using 0");
            0
        }
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        None => {
            warn!(attr, value, "not an integer, using 0");
            0
        }
    }
}

fn image_extent(attr: &str, value: Option<&str>) -> Option<f64> {
    let value = non_empty(value)?;
    let parsed = value.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    if parsed.is_none() {
        warn!(attr, value, "background image attribute is not numeric");
    }
    parsed
}
