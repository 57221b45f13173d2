#![forbid(unsafe_code)]

//! Responsive layout engine for the frosted panel widget.
//!
//! This crate contains everything that does not need a browser:
//!
//! - [`dimension`] - token validation (`auto`, `<n>px`, `<n>%`) and breakpoint specs
//! - [`config`] - turning raw attribute strings into an immutable [`PanelConfig`]
//! - [`responsive`] - picking the active breakpoint for a viewport width
//! - [`cover`] - `background-size: cover` geometry
//! - [`ready`] - the one-shot "background image loaded" gate
//! - [`engine`] - the per-resize [`LayoutEngine`] driving a [`LayoutHost`]
//!
//! The DOM side lives in `frosted-web`, which implements [`LayoutHost`] on top
//! of `web-sys`.
//!
//! ```ignore
//! use frosted_layout::{LayoutEngine, RawAttributes, config};
//!
//! let raw = RawAttributes {
//!     panel_dimensions: Some("50% auto".into()),
//!     breakpoints: Some("600px 400px auto, 1000px 40% 60%".into()),
//!     ..RawAttributes::default()
//! };
//! let config = config::load(&raw)?;
//! let mut engine = LayoutEngine::new(config, host);
//! engine.start();
//! ```

pub mod config;
pub mod cover;
pub mod dimension;
pub mod engine;
pub mod ready;
pub mod responsive;

pub use config::{BreakpointMode, ConfigError, PanelConfig, RawAttributes};
pub use cover::{CoverSize, compute_cover};
pub use dimension::{Breakpoint, BreakpointSpecError, Dimension, DimensionError};
pub use engine::{
    AxisMode, ContentAutoState, EngineState, LayoutEngine, LayoutHost, LayoutResult,
    PanTransform, StyleCommand, ViewportSample,
};
pub use ready::ReadyGate;
pub use responsive::{ActiveSize, SizeSource};

use serde::{Deserialize, Serialize};

/// One of the two panel axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Horizontal extent.
    Width,
    /// Vertical extent.
    Height,
}

impl Axis {
    /// Both axes, width first.
    pub const ALL: [Axis; 2] = [Axis::Width, Axis::Height];

    /// CSS property name for this axis.
    #[must_use]
    pub const fn css_property(self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.css_property())
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Extent along `axis`.
    #[inline]
    pub const fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }
}
