#![forbid(unsafe_code)]

//! The DOM the panel reads from and writes to, without any JS types.
//!
//! [`dom_writes`] lowers an engine [`StyleCommand`] into concrete style,
//! attribute and message writes on named [`Target`]s. The wasm host only
//! has to look the targets up and perform the writes, which keeps the
//! mapping testable natively.

use frosted_layout::StyleCommand;

/// The frosted panel element.
pub const PANEL_SELECTOR: &str = ".frosted-panel";
/// The content box inside the panel.
pub const CONTENT_SELECTOR: &str = ".content";
/// The SVG `<image>` rendering the background.
pub const IMAGE_SELECTOR: &str = "image";

/// Image source attributes, in lookup order.
pub const IMAGE_SOURCE_ATTRS: [&str; 2] = ["xlink:href", "href"];
pub const IMAGE_WIDTH_ATTR: &str = "width";
pub const IMAGE_HEIGHT_ATTR: &str = "height";

/// Posted to the parent frame once the panel is visible.
pub const HIDE_LOAD_MESSAGE: &str = "hideLoad";

/// Element a write applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Panel,
    Content,
    Image,
    Body,
    /// The root `<html>` element.
    Document,
}

/// A single DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomWrite {
    /// Inline style property.
    Style {
        target: Target,
        property: &'static str,
        value: String,
    },
    /// Element attribute.
    Attribute {
        target: Target,
        name: &'static str,
        value: String,
    },
    /// `postMessage` to the parent window.
    PostToParent(&'static str),
}

impl DomWrite {
    fn style(target: Target, property: &'static str, value: impl Into<String>) -> Self {
        Self::Style {
            target,
            property,
            value: value.into(),
        }
    }
}

/// Format a CSS pixel length.
#[must_use]
pub fn css_px(value: f64) -> String {
    format!("{value}px")
}

/// Format a CSS `url()` with the source quoted.
#[must_use]
pub fn css_url(source: &str) -> String {
    format!("url(\"{}\")", source.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Lower an engine command into DOM writes, in application order.
#[must_use]
pub fn dom_writes(command: &StyleCommand) -> Vec<DomWrite> {
    match command {
        StyleCommand::AxisAuto { axis } => vec![
            DomWrite::style(Target::Content, axis.css_property(), "auto"),
            DomWrite::style(Target::Panel, axis.css_property(), "auto"),
        ],
        StyleCommand::AxisFixed {
            axis,
            panel_px,
            content_px,
        } => vec![
            DomWrite::style(Target::Content, axis.css_property(), css_px(*content_px)),
            DomWrite::style(Target::Panel, axis.css_property(), css_px(*panel_px)),
        ],
        StyleCommand::ContentMargin { px } => {
            vec![DomWrite::style(Target::Content, "margin", css_px(f64::from(*px)))]
        }
        StyleCommand::BackgroundImage { source } => {
            vec![DomWrite::style(Target::Body, "background-image", css_url(source))]
        }
        StyleCommand::DocumentMinHeight { px } => {
            vec![DomWrite::style(Target::Document, "min-height", css_px(*px))]
        }
        StyleCommand::ImageTransform(transform) => vec![DomWrite::Attribute {
            target: Target::Image,
            name: "transform",
            value: transform.to_string(),
        }],
        StyleCommand::RevealPanel => vec![
            DomWrite::style(Target::Panel, "visibility", "visible"),
            DomWrite::PostToParent(HIDE_LOAD_MESSAGE),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frosted_layout::{Axis, PanTransform};
    use pretty_assertions::assert_eq;

    #[test]
    fn pixel_formatting() {
        assert_eq!(css_px(400.0), "400px");
        assert_eq!(css_px(312.5), "312.5px");
        assert_eq!(css_px(-5.0), "-5px");
    }

    #[test]
    fn url_quoting() {
        assert_eq!(css_url("img/bg.jpg"), "url(\"img/bg.jpg\")");
        assert_eq!(css_url("a\"b"), "url(\"a\\\"b\")");
    }

    #[test]
    fn auto_axis_touches_content_then_panel() {
        assert_eq!(
            dom_writes(&StyleCommand::AxisAuto { axis: Axis::Height }),
            vec![
                DomWrite::style(Target::Content, "height", "auto"),
                DomWrite::style(Target::Panel, "height", "auto"),
            ]
        );
    }

    #[test]
    fn fixed_axis_sets_both_sizes() {
        let writes = dom_writes(&StyleCommand::AxisFixed {
            axis: Axis::Width,
            panel_px: 400.0,
            content_px: 380.0,
        });
        assert_eq!(
            writes,
            vec![
                DomWrite::style(Target::Content, "width", "380px"),
                DomWrite::style(Target::Panel, "width", "400px"),
            ]
        );
    }

    #[test]
    fn transform_goes_to_image_attribute() {
        let writes = dom_writes(&StyleCommand::ImageTransform(PanTransform {
            pan_x: -600.0,
            pan_y: -300.0,
            scale: 1.6,
        }));
        assert_eq!(
            writes,
            vec![DomWrite::Attribute {
                target: Target::Image,
                name: "transform",
                value: "translate(-600 -300) scale(1.6)".into(),
            }]
        );
    }

    #[test]
    fn one_time_styles() {
        assert_eq!(
            dom_writes(&StyleCommand::ContentMargin { px: 12 }),
            vec![DomWrite::style(Target::Content, "margin", "12px")]
        );
        assert_eq!(
            dom_writes(&StyleCommand::DocumentMinHeight { px: 640.0 }),
            vec![DomWrite::style(Target::Document, "min-height", "640px")]
        );
        assert_eq!(
            dom_writes(&StyleCommand::RevealPanel),
            vec![
                DomWrite::style(Target::Panel, "visibility", "visible"),
                DomWrite::PostToParent(HIDE_LOAD_MESSAGE),
            ]
        );
    }
}
