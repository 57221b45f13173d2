#![forbid(unsafe_code)]

//! Breakpoint resolution: which size applies at a given viewport width.
//!
//! # Invariants
//!
//! 1. Breakpoints arrive sorted for their mode (ascending for `min-width`,
//!    descending for `max-width`), so suitability is monotonic along the
//!    list: once an entry stops matching, no later entry matches.
//! 2. With no breakpoints, or when the first entry does not match, the base
//!    size from [`PanelConfig`] is returned.
//! 3. Otherwise the last matching entry in scan order wins, which is the
//!    tightest bound: the largest `min-width` or the smallest `max-width`
//!    that still holds.
//!
//! # Failure Modes
//!
//! None. Resolution always yields a size.

use serde::Serialize;

use crate::config::PanelConfig;
use crate::dimension::Dimension;

/// Where the active size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeSource {
    /// `panel-dimensions`.
    Base,
    /// A breakpoint, by position in [`PanelConfig::breakpoints`].
    Breakpoint { index: usize, threshold_px: i32 },
}

/// The width/height tokens in effect for a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveSize {
    pub width: Dimension,
    pub height: Dimension,
    pub source: SizeSource,
}

impl ActiveSize {
    fn base(config: &PanelConfig) -> Self {
        Self {
            width: config.base_width(),
            height: config.base_height(),
            source: SizeSource::Base,
        }
    }
}

/// Resolve the active size for `viewport_width`.
#[must_use]
pub fn resolve(config: &PanelConfig, viewport_width: f64) -> ActiveSize {
    let mode = config.breakpoint_mode();
    let breakpoints = config.breakpoints();

    // The first entry is the most permissive bound; if it doesn't hold,
    // nothing later will.
    match breakpoints.first() {
        Some(first) if mode.matches(first.threshold_px, viewport_width) => {}
        _ => return ActiveSize::base(config),
    }

    breakpoints
        .iter()
        .enumerate()
        .take_while(|(_, bp)| mode.matches(bp.threshold_px, viewport_width))
        .last()
        .map_or_else(
            || ActiveSize::base(config),
            |(index, bp)| ActiveSize {
                width: bp.width,
                height: bp.height,
                source: SizeSource::Breakpoint {
                    index,
                    threshold_px: bp.threshold_px,
                },
            },
        )
}
