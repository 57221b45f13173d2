//! End-to-end layout passes against a recording host.

use frosted_layout::config::{self, RawAttributes};
use frosted_layout::{
    Axis, AxisMode, EngineState, LayoutEngine, LayoutHost, PanTransform, Size, SizeSource,
    StyleCommand, ViewportSample,
};
use pretty_assertions::assert_eq;

/// Host that reports fixed measurements and records every command.
#[derive(Debug)]
struct RecordingHost {
    viewport: ViewportSample,
    container: Option<Size>,
    content: Size,
    commands: Vec<StyleCommand>,
}

impl RecordingHost {
    fn new(width: f64, height: f64) -> Self {
        Self {
            viewport: ViewportSample::new(width, height),
            container: None,
            content: Size::new(300.0, 120.0),
            commands: Vec::new(),
        }
    }

    fn take(&mut self) -> Vec<StyleCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl LayoutHost for RecordingHost {
    fn viewport(&self) -> ViewportSample {
        self.viewport
    }

    fn container_size(&self) -> Size {
        self.container
            .unwrap_or(Size::new(self.viewport.width, self.viewport.height))
    }

    fn content_size(&self) -> Size {
        self.content
    }

    fn apply(&mut self, command: StyleCommand) {
        self.commands.push(command);
    }
}

fn attrs(panel_dimensions: &str) -> RawAttributes {
    RawAttributes {
        panel_dimensions: Some(panel_dimensions.into()),
        image_width: Some("1000".into()),
        image_height: Some("500".into()),
        ..RawAttributes::default()
    }
}

fn engine(raw: &RawAttributes, host: RecordingHost) -> LayoutEngine<RecordingHost> {
    let config = config::load(raw).expect("valid config");
    LayoutEngine::new(config, host)
}

fn started(raw: &RawAttributes, host: RecordingHost) -> LayoutEngine<RecordingHost> {
    let mut engine = engine(raw, host);
    engine.start();
    engine.host_mut().take();
    engine
}

#[test]
fn start_applies_initial_styles_in_order() {
    let mut raw = attrs("400px 200px");
    raw.content_margin = Some("10".into());
    raw.space_top_bot = Some("20".into());
    raw.image_source = Some("forest.jpg".into());
    let mut engine = engine(&raw, RecordingHost::new(800.0, 800.0));
    assert_eq!(engine.state(), EngineState::Uninitialized);

    let result = engine.start().expect("first pass runs");
    assert_eq!(engine.state(), EngineState::Ready);
    assert_eq!(
        engine.host_mut().take(),
        vec![
            StyleCommand::ContentMargin { px: 10 },
            StyleCommand::BackgroundImage {
                source: "forest.jpg".into()
            },
            StyleCommand::AxisFixed {
                axis: Axis::Width,
                panel_px: 400.0,
                content_px: 380.0,
            },
            StyleCommand::AxisFixed {
                axis: Axis::Height,
                panel_px: 200.0,
                content_px: 180.0,
            },
            StyleCommand::DocumentMinHeight { px: 240.0 },
            StyleCommand::ImageTransform(PanTransform {
                pan_x: -600.0,
                pan_y: -300.0,
                scale: 1.6,
            }),
            StyleCommand::RevealPanel,
        ]
    );
    assert_eq!(result.content_width_px, 380.0);
    assert_eq!(result.content_height_px, 180.0);
    assert_eq!(result.document_min_height_px, 240.0);
}

#[test]
fn start_is_one_shot() {
    let mut engine = started(&attrs("400px 200px"), RecordingHost::new(800.0, 800.0));
    assert_eq!(engine.start(), None);
    assert!(engine.host().commands.is_empty());
}

#[test]
fn layout_before_start_does_nothing() {
    let mut engine = engine(&attrs("400px 200px"), RecordingHost::new(800.0, 800.0));
    assert_eq!(engine.relayout(), None);
    assert!(engine.host().commands.is_empty());
    assert_eq!(engine.last_result(), None);
}

#[test]
fn unchanged_viewport_is_a_no_op() {
    let mut engine = started(&attrs("50% 50%"), RecordingHost::new(1024.0, 768.0));
    let viewport = ViewportSample::new(1024.0, 768.0);
    assert_eq!(engine.layout(viewport), None);
    assert!(engine.host().commands.is_empty());

    let changed = engine.layout(ViewportSample::new(1024.0, 700.0));
    assert!(changed.is_some());
    assert!(!engine.host().commands.is_empty());
}

#[test]
fn height_only_change_triggers_a_pass() {
    let mut engine = started(&attrs("50% 50%"), RecordingHost::new(1024.0, 768.0));
    let result = engine
        .layout(ViewportSample::new(1024.0, 400.0))
        .expect("height changed");
    assert_eq!(result.panel_height_px, 200.0);
}

#[test]
fn percent_sizes_follow_each_axis() {
    let mut raw = attrs("50% 25%");
    raw.content_margin = Some("10".into());
    let mut engine = started(&raw, RecordingHost::new(800.0, 800.0));

    let result = engine
        .layout(ViewportSample::new(1000.0, 800.0))
        .expect("new viewport");
    assert_eq!(result.panel_width_px, 500.0);
    assert_eq!(result.panel_height_px, 200.0);
    assert_eq!(result.content_width_px, 480.0);
    assert_eq!(result.content_height_px, 180.0);
    assert_eq!(engine.auto_state().width, AxisMode::Fixed);
    assert_eq!(engine.auto_state().height, AxisMode::Fixed);
}

#[test]
fn auto_axis_flips_once_then_measures() {
    let mut raw = attrs("auto 300px");
    raw.content_margin = Some("5".into());
    let mut engine = engine(&raw, RecordingHost::new(800.0, 600.0));

    let first = engine.start().expect("first pass");
    assert_eq!(first.panel_width_px, 310.0);
    assert_eq!(first.content_width_px, 300.0);
    let commands = engine.host_mut().take();
    assert!(commands.contains(&StyleCommand::AxisAuto { axis: Axis::Width }));

    engine.host_mut().content = Size::new(280.0, 120.0);
    let second = engine
        .layout(ViewportSample::new(640.0, 600.0))
        .expect("second pass");
    assert_eq!(second.panel_width_px, 290.0);
    let commands = engine.host_mut().take();
    assert!(
        !commands
            .iter()
            .any(|c| matches!(c, StyleCommand::AxisAuto { .. })),
        "axis already auto: {commands:?}"
    );
}

#[test]
fn breakpoint_switches_between_auto_and_fixed() {
    let mut raw = attrs("auto auto");
    raw.breakpoints = Some("600px 400px 50%".into());
    let mut engine = started(&raw, RecordingHost::new(500.0, 500.0));
    assert_eq!(engine.auto_state().width, AxisMode::Auto);

    let wide = engine
        .layout(ViewportSample::new(700.0, 500.0))
        .expect("wide pass");
    assert_eq!(
        wide.source,
        SizeSource::Breakpoint {
            index: 0,
            threshold_px: 600
        }
    );
    assert_eq!(wide.panel_width_px, 400.0);
    assert_eq!(wide.panel_height_px, 250.0);
    assert_eq!(engine.auto_state().width, AxisMode::Fixed);
    engine.host_mut().take();

    let narrow = engine
        .layout(ViewportSample::new(500.0, 500.0))
        .expect("narrow pass");
    assert_eq!(narrow.source, SizeSource::Base);
    assert_eq!(
        &engine.host().commands[..2],
        &[
            StyleCommand::AxisAuto { axis: Axis::Width },
            StyleCommand::AxisAuto { axis: Axis::Height },
        ]
    );
}

#[test]
fn max_width_breakpoints_resolve_from_most_permissive() {
    let mut raw = attrs("900px 600px");
    raw.breakpoint_type = Some("max-width".into());
    raw.breakpoints = Some("100px 10px 10px, 300px 30px 30px, 200px 20px 20px".into());
    let mut engine = started(&raw, RecordingHost::new(1200.0, 800.0));
    assert_eq!(engine.last_result().map(|r| r.panel_width_px), Some(900.0));

    let result = engine
        .layout(ViewportSample::new(150.0, 800.0))
        .expect("narrow pass");
    assert_eq!(result.panel_width_px, 20.0);
}

#[test]
fn pan_is_centred_under_the_panel() {
    let mut engine = started(&attrs("400px 200px"), RecordingHost::new(800.0, 800.0));
    let transform = engine
        .last_result()
        .and_then(|r| r.transform)
        .expect("image size known");
    assert_eq!(transform.to_string(), "translate(-600 -300) scale(1.6)");

    // Tall image, width-bound.
    let mut raw = attrs("800px 800px");
    raw.image_width = Some("400".into());
    raw.image_height = Some("800".into());
    engine = started(&raw, RecordingHost::new(800.0, 800.0));
    let transform = engine
        .last_result()
        .and_then(|r| r.transform)
        .expect("image size known");
    assert_eq!(
        transform,
        PanTransform {
            pan_x: 0.0,
            pan_y: -400.0,
            scale: 2.0,
        }
    );
}

#[test]
fn cover_uses_container_box_not_viewport() {
    let mut host = RecordingHost::new(800.0, 800.0);
    host.container = Some(Size::new(800.0, 1000.0));
    let engine = started(&attrs("800px 800px"), host);
    let transform = engine
        .last_result()
        .and_then(|r| r.transform)
        .expect("image size known");
    // Height-bound against the 1000px container.
    assert_eq!(transform.scale, 2.0);
    assert_eq!(transform.pan_x, -600.0);
    assert_eq!(transform.pan_y, -100.0);
}

#[test]
fn unknown_image_size_skips_transform_only() {
    let raw = RawAttributes {
        panel_dimensions: Some("400px 200px".into()),
        ..RawAttributes::default()
    };
    let mut engine = engine(&raw, RecordingHost::new(800.0, 800.0));
    let result = engine.start().expect("pass still runs");
    assert_eq!(result.transform, None);
    assert_eq!(result.panel_width_px, 400.0);
    assert!(
        !engine
            .host()
            .commands
            .iter()
            .any(|c| matches!(c, StyleCommand::ImageTransform(_)))
    );
}

#[test]
fn degenerate_container_skips_transform() {
    let mut host = RecordingHost::new(800.0, 800.0);
    host.container = Some(Size::new(800.0, 0.0));
    let engine = started(&attrs("400px 200px"), host);
    assert_eq!(engine.last_result().and_then(|r| r.transform), None);
}

#[test]
fn missing_panel_dimensions_never_lays_out() {
    let raw = RawAttributes {
        breakpoints: Some("600px 50% 50%".into()),
        ..RawAttributes::default()
    };
    assert!(config::load(&raw).is_err());
}

#[test]
fn layout_result_serializes() {
    let engine = started(&attrs("400px 200px"), RecordingHost::new(800.0, 800.0));
    let json = serde_json::to_value(engine.last_result().expect("ran")).expect("serializable");
    assert_eq!(json["panel_width_px"], 400.0);
    assert_eq!(json["source"]["kind"], "base");
    assert_eq!(json["transform"]["scale"], 1.6);
}
