#![forbid(unsafe_code)]

//! Per-resize layout passes.
//!
//! [`LayoutEngine`] owns the [`PanelConfig`] and drives a [`LayoutHost`]: the
//! host reports viewport and element sizes and applies [`StyleCommand`]s;
//! the engine decides what to apply.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --start()--> Ready --layout()/relayout()--> Ready ...
//! ```
//!
//! `start()` is called once the background image has loaded (see
//! [`ReadyGate`](crate::ReadyGate)). Passes requested before that return
//! `None`.
//!
//! # Invariants
//!
//! 1. A pass whose viewport equals the previous sample issues no commands
//!    and returns `None`.
//! 2. An `auto` axis is flipped to auto *before* the content box is
//!    measured, and `AxisAuto` is only issued when the axis was not already
//!    auto.
//! 3. A fixed axis always issues `AxisFixed`; content = panel - 2 * margin.
//! 4. Cover geometry is computed against [`LayoutHost::container_size`];
//!    pan offsets are relative to the viewport.
//!
//! # Failure Modes
//!
//! - Unknown image size or a degenerate container: the transform is skipped
//!   with a warning; panel sizing still applies and the previous transform
//!   stays in place.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::config::PanelConfig;
use crate::cover::compute_cover;
use crate::dimension::Dimension;
use crate::responsive::{self, SizeSource};
use crate::{Axis, Size};

/// Viewport size in CSS pixels, sampled once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ViewportSample {
    pub width: f64,
    pub height: f64,
}

impl ViewportSample {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }
}

/// Translate + scale applied to the background image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

/// Renders as an SVG `transform` attribute value.
impl fmt::Display for PanTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({} {}) scale({})",
            self.pan_x, self.pan_y, self.scale
        )
    }
}

/// A style mutation for the host to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleCommand {
    /// Set content and panel `axis` to `auto`.
    AxisAuto { axis: Axis },
    /// Set panel `axis` to `panel_px` and content `axis` to `content_px`.
    AxisFixed {
        axis: Axis,
        panel_px: f64,
        content_px: f64,
    },
    /// Margin around the content box.
    ContentMargin { px: u32 },
    /// Page background image source.
    BackgroundImage { source: String },
    /// Minimum height of the document element.
    DocumentMinHeight { px: f64 },
    /// Transform of the SVG background image.
    ImageTransform(PanTransform),
    /// Make the panel visible and dismiss any loading indicator.
    RevealPanel,
}

/// Capabilities the engine needs from its surroundings.
pub trait LayoutHost {
    /// Current viewport size.
    fn viewport(&self) -> ViewportSample;

    /// Box the background image must cover.
    fn container_size(&self) -> Size;

    /// Measured size of the content box.
    fn content_size(&self) -> Size;

    /// Apply a style mutation.
    fn apply(&mut self, command: StyleCommand);
}

/// Sizing mode of one content axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMode {
    /// No pass has touched the axis yet.
    #[default]
    Unset,
    /// Sized by its content.
    Auto,
    /// Sized explicitly.
    Fixed,
}

/// Per-axis auto/fixed tracking across passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContentAutoState {
    pub width: AxisMode,
    pub height: AxisMode,
}

impl ContentAutoState {
    #[inline]
    pub const fn get(self, axis: Axis) -> AxisMode {
        match axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    fn slot(&mut self, axis: Axis) -> &mut AxisMode {
        match axis {
            Axis::Width => &mut self.width,
            Axis::Height => &mut self.height,
        }
    }

    /// Move `axis` to auto. Returns `true` if it was not auto before, i.e.
    /// styles need flipping.
    pub fn enter_auto(&mut self, axis: Axis) -> bool {
        let slot = self.slot(axis);
        let changed = *slot != AxisMode::Auto;
        *slot = AxisMode::Auto;
        changed
    }

    /// Move `axis` to fixed.
    pub fn enter_fixed(&mut self, axis: Axis) {
        *self.slot(axis) = AxisMode::Fixed;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Waiting for the background image.
    #[default]
    Uninitialized,
    /// Laying out on demand.
    Ready,
}

/// Output of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutResult {
    pub viewport: ViewportSample,
    pub source: SizeSource,
    pub panel_width_px: f64,
    pub panel_height_px: f64,
    pub content_width_px: f64,
    pub content_height_px: f64,
    pub document_min_height_px: f64,
    /// `None` when the image size is unknown or the container is degenerate.
    pub transform: Option<PanTransform>,
}

/// Responsive layout engine for one panel.
pub struct LayoutEngine<H> {
    config: PanelConfig,
    host: H,
    state: EngineState,
    auto: ContentAutoState,
    previous: Option<ViewportSample>,
    last: Option<LayoutResult>,
}

impl<H: fmt::Debug> fmt::Debug for LayoutEngine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("state", &self.state)
            .field("auto", &self.auto)
            .field("previous", &self.previous)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl<H: LayoutHost> LayoutEngine<H> {
    /// Create an engine in the `Uninitialized` state.
    pub fn new(config: PanelConfig, host: H) -> Self {
        Self {
            config,
            host,
            state: EngineState::Uninitialized,
            auto: ContentAutoState::default(),
            previous: None,
            last: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    #[inline]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[inline]
    pub fn auto_state(&self) -> ContentAutoState {
        self.auto
    }

    /// Result of the most recent pass that did work.
    #[inline]
    pub fn last_result(&self) -> Option<&LayoutResult> {
        self.last.as_ref()
    }

    /// Enter `Ready`: apply one-time styles, run the first pass and reveal
    /// the panel. No-op when already started.
    pub fn start(&mut self) -> Option<LayoutResult> {
        if self.state == EngineState::Ready {
            debug!("panel already started");
            return None;
        }
        self.state = EngineState::Ready;

        self.host.apply(StyleCommand::ContentMargin {
            px: self.config.content_margin_px(),
        });
        if let Some(source) = self.config.image_source() {
            self.host.apply(StyleCommand::BackgroundImage {
                source: source.to_string(),
            });
        }

        let result = self.relayout();
        self.host.apply(StyleCommand::RevealPanel);
        debug!("panel started");
        result
    }

    /// Lay out for the host's current viewport.
    pub fn relayout(&mut self) -> Option<LayoutResult> {
        let viewport = self.host.viewport();
        self.layout(viewport)
    }

    /// Lay out for `viewport`.
    ///
    /// Returns `None` before `start()` or when `viewport` matches the
    /// previous pass.
    pub fn layout(&mut self, viewport: ViewportSample) -> Option<LayoutResult> {
        if self.state != EngineState::Ready {
            trace!("layout requested before start");
            return None;
        }
        if self.previous == Some(viewport) {
            trace!(?viewport, "viewport unchanged; skipping layout");
            return None;
        }
        self.previous = Some(viewport);

        let active = responsive::resolve(&self.config, viewport.width);
        trace!(?viewport, source = ?active.source, "resolved panel size");

        let panel_width = self.axis_pixels(Axis::Width, active.width, viewport);
        let panel_height = self.axis_pixels(Axis::Height, active.height, viewport);
        let margin = self.margin_total();

        let document_min_height =
            panel_height + 2.0 * f64::from(self.config.vertical_padding_px());
        self.host.apply(StyleCommand::DocumentMinHeight {
            px: document_min_height,
        });

        let transform = self.pan_transform(viewport, panel_width, panel_height);
        if let Some(transform) = transform {
            self.host.apply(StyleCommand::ImageTransform(transform));
        }

        let result = LayoutResult {
            viewport,
            source: active.source,
            panel_width_px: panel_width,
            panel_height_px: panel_height,
            content_width_px: panel_width - margin,
            content_height_px: panel_height - margin,
            document_min_height_px: document_min_height,
            transform,
        };
        self.last = Some(result);
        Some(result)
    }

    /// Margin on both sides of one axis.
    fn margin_total(&self) -> f64 {
        2.0 * f64::from(self.config.content_margin_px())
    }

    /// Panel pixel size along `axis`, applying the matching styles.
    fn axis_pixels(&mut self, axis: Axis, dimension: Dimension, viewport: ViewportSample) -> f64 {
        let margin = self.margin_total();
        match dimension {
            Dimension::Percent(n) => {
                let px = viewport.get(axis) / 100.0 * n;
                self.fix_axis(axis, px, margin);
                px
            }
            Dimension::Pixels(px) => {
                self.fix_axis(axis, px, margin);
                px
            }
            Dimension::Auto => {
                // Flip first so the measurement reflects intrinsic sizing.
                if self.auto.enter_auto(axis) {
                    self.host.apply(StyleCommand::AxisAuto { axis });
                }
                self.host.content_size().get(axis) + margin
            }
        }
    }

    fn fix_axis(&mut self, axis: Axis, panel_px: f64, margin: f64) {
        self.host.apply(StyleCommand::AxisFixed {
            axis,
            panel_px,
            content_px: panel_px - margin,
        });
        self.auto.enter_fixed(axis);
    }

    fn pan_transform(
        &self,
        viewport: ViewportSample,
        panel_width: f64,
        panel_height: f64,
    ) -> Option<PanTransform> {
        let Some((image_width, image_height)) = self.config.image_size() else {
            warn!("background image size unknown; skipping pan and zoom");
            return None;
        };
        let container = self.host.container_size();
        let Some(cover) = compute_cover(image_width, image_height, container.width, container.height)
        else {
            warn!(
                image_width,
                image_height,
                container_width = container.width,
                container_height = container.height,
                "cover geometry undefined; skipping pan and zoom"
            );
            return None;
        };

        // Centre the covering image under the viewport, then shift by how far
        // the panel is inset from the viewport edges.
        let crop_x = (cover.width - viewport.width) / 2.0;
        let crop_y = (cover.height - viewport.height) / 2.0;
        Some(PanTransform {
            pan_x: -(viewport.width - panel_width) / 2.0 - crop_x,
            pan_y: -(viewport.height - panel_height) / 2.0 - crop_y,
            scale: cover.scale,
        })
    }
}
