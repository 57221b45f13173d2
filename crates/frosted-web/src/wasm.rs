//! `wasm-bindgen` exports and the `web-sys` [`LayoutHost`].

use std::cell::RefCell;
use std::rc::Rc;

use frosted_layout::config::{
    self, BREAKPOINT_TYPE_ATTR, BREAKPOINTS_ATTR, CONTENT_MARGIN_ATTR, PANEL_DIMENSIONS_ATTR,
    RawAttributes, SPACE_TOP_BOT_ATTR,
};
use frosted_layout::{LayoutEngine, LayoutHost, ReadyGate, Size, StyleCommand, ViewportSample};
use gloo::events::EventListener;
use tracing::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, Window};

use crate::console_log;
use crate::dom::{
    self, CONTENT_SELECTOR, DomWrite, IMAGE_HEIGHT_ATTR, IMAGE_SELECTOR, IMAGE_SOURCE_ATTRS,
    IMAGE_WIDTH_ATTR, PANEL_SELECTOR, Target,
};

fn query_html(document: &Document, selector: &str) -> Result<HtmlElement, JsValue> {
    document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("element \"{selector}\" not found")))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("element \"{selector}\" is not an HTML element")))
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Live DOM handles the engine measures and writes.
#[derive(Debug)]
struct DomHost {
    window: Window,
    html: HtmlElement,
    body: HtmlElement,
    panel: HtmlElement,
    content: HtmlElement,
    image: Element,
}

impl DomHost {
    fn locate() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window.document().ok_or_else(|| js_error("no document"))?;
        let html = document
            .document_element()
            .ok_or_else(|| js_error("no document element"))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| js_error("document element is not HTML"))?;
        let body = document.body().ok_or_else(|| js_error("no body"))?;
        let panel = query_html(&document, PANEL_SELECTOR)?;
        let content = query_html(&document, CONTENT_SELECTOR)?;
        let image = document
            .query_selector(IMAGE_SELECTOR)?
            .ok_or_else(|| js_error(format!("element \"{IMAGE_SELECTOR}\" not found")))?;
        Ok(Self {
            window,
            html,
            body,
            panel,
            content,
            image,
        })
    }

    fn collect_attributes(&self) -> RawAttributes {
        RawAttributes {
            panel_dimensions: self.panel.get_attribute(PANEL_DIMENSIONS_ATTR),
            breakpoints: self.panel.get_attribute(BREAKPOINTS_ATTR),
            breakpoint_type: self.panel.get_attribute(BREAKPOINT_TYPE_ATTR),
            content_margin: self.content.get_attribute(CONTENT_MARGIN_ATTR),
            space_top_bot: self.body.get_attribute(SPACE_TOP_BOT_ATTR),
            image_width: self.image.get_attribute(IMAGE_WIDTH_ATTR),
            image_height: self.image.get_attribute(IMAGE_HEIGHT_ATTR),
            image_source: IMAGE_SOURCE_ATTRS
                .iter()
                .find_map(|name| self.image.get_attribute(name)),
        }
    }

    fn element(&self, target: Target) -> &Element {
        match target {
            Target::Panel => self.panel.as_ref(),
            Target::Content => self.content.as_ref(),
            Target::Image => &self.image,
            Target::Body => self.body.as_ref(),
            Target::Document => self.html.as_ref(),
        }
    }

    fn html_element(&self, target: Target) -> Option<&HtmlElement> {
        match target {
            Target::Panel => Some(&self.panel),
            Target::Content => Some(&self.content),
            Target::Body => Some(&self.body),
            Target::Document => Some(&self.html),
            Target::Image => None,
        }
    }

    fn execute(&self, write: &DomWrite) -> Result<(), JsValue> {
        match write {
            DomWrite::Style {
                target,
                property,
                value,
            } => {
                let element = self
                    .html_element(*target)
                    .ok_or_else(|| js_error(format!("{target:?} has no inline style")))?;
                element.style().set_property(property, value)
            }
            DomWrite::Attribute {
                target,
                name,
                value,
            } => self.element(*target).set_attribute(name, value),
            DomWrite::PostToParent(message) => match self.window.parent()? {
                Some(parent) => parent.post_message(&JsValue::from_str(message), "*"),
                None => Ok(()),
            },
        }
    }

    fn window_extent(value: Result<JsValue, JsValue>) -> Option<f64> {
        value
            .ok()
            .and_then(|v| v.as_f64())
            .filter(|v| *v > 0.0)
    }
}

impl LayoutHost for DomHost {
    fn viewport(&self) -> ViewportSample {
        let width = Self::window_extent(self.window.inner_width())
            .unwrap_or_else(|| f64::from(self.html.client_width()));
        let height = Self::window_extent(self.window.inner_height())
            .unwrap_or_else(|| f64::from(self.html.client_height()));
        ViewportSample::new(width, height)
    }

    fn container_size(&self) -> Size {
        Size::new(
            f64::from(self.body.offset_width()),
            f64::from(self.body.offset_height()),
        )
    }

    fn content_size(&self) -> Size {
        Size::new(
            f64::from(self.content.client_width()),
            f64::from(self.content.client_height()),
        )
    }

    fn apply(&mut self, command: StyleCommand) {
        for write in dom::dom_writes(&command) {
            if let Err(err) = self.execute(&write) {
                warn!(?write, ?err, "DOM write failed");
            }
        }
    }
}

/// Installs console logging and the panic hook; mounting is left to JS.
#[wasm_bindgen(start)]
pub fn start() {
    console_log::install();
}

type SharedEngine = Rc<RefCell<LayoutEngine<DomHost>>>;
type Listeners = Rc<RefCell<Vec<EventListener>>>;

/// Start the engine and follow viewport resizes from then on.
fn start_panel(engine: &SharedEngine, listeners: &Listeners, window: &Window) {
    engine.borrow_mut().start();

    let engine = Rc::clone(engine);
    let resize = EventListener::new(window, "resize", move |_event| {
        engine.borrow_mut().relayout();
    });
    listeners.borrow_mut().push(resize);
}

/// A mounted frosted panel.
///
/// Dropping the handle detaches the resize and load listeners.
#[wasm_bindgen]
pub struct FrostedPanel {
    engine: SharedEngine,
    listeners: Listeners,
    _gate: Rc<RefCell<ReadyGate>>,
    _image: Option<HtmlImageElement>,
}

#[wasm_bindgen]
impl FrostedPanel {
    /// Mount using the attributes found on the page.
    ///
    /// Throws when the configuration is invalid; nothing is rendered then.
    pub fn mount() -> Result<FrostedPanel, JsValue> {
        console_log::install();
        let host = DomHost::locate()?;
        let raw = host.collect_attributes();
        Self::mount_with(host, &raw)
    }

    /// Mount using attributes supplied as a JSON object keyed by attribute
    /// name (`{"panel-dimensions": "50% auto", ...}`) instead of the DOM.
    #[wasm_bindgen(js_name = mountWithJson)]
    pub fn mount_with_json(json: &str) -> Result<FrostedPanel, JsValue> {
        console_log::install();
        let host = DomHost::locate()?;
        let raw: RawAttributes = serde_json::from_str(json).map_err(js_error)?;
        Self::mount_with(host, &raw)
    }

    /// Re-run layout for the current viewport. Returns the pass as JSON, or
    /// `undefined` when nothing changed.
    pub fn relayout(&self) -> Option<String> {
        let result = self.engine.borrow_mut().relayout()?;
        serde_json::to_string(&result).ok()
    }

    /// The loaded configuration as JSON.
    #[wasm_bindgen(js_name = configJson)]
    pub fn config_json(&self) -> String {
        serde_json::to_string(self.engine.borrow().config()).unwrap_or_default()
    }

    /// The most recent layout pass as JSON, if any ran.
    #[wasm_bindgen(js_name = lastLayoutJson)]
    pub fn last_layout_json(&self) -> Option<String> {
        let engine = self.engine.borrow();
        serde_json::to_string(engine.last_result()?).ok()
    }

    /// Whether the background image has loaded and the panel started.
    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.engine.borrow().state() == frosted_layout::EngineState::Ready
    }
}

impl FrostedPanel {
    fn mount_with(host: DomHost, raw: &RawAttributes) -> Result<FrostedPanel, JsValue> {
        let config = config::load(raw).map_err(|err| {
            error!(%err, "invalid panel configuration");
            error!("frosted panel aborted");
            js_error(&err)
        })?;

        let window = host.window.clone();
        let source = config.image_source().map(str::to_string);
        let engine: SharedEngine = Rc::new(RefCell::new(LayoutEngine::new(config, host)));
        let listeners: Listeners = Rc::new(RefCell::new(Vec::new()));
        let gate = Rc::new(RefCell::new(ReadyGate::new()));

        {
            let engine = Rc::clone(&engine);
            let listeners = Rc::clone(&listeners);
            let window = window.clone();
            gate.borrow_mut().subscribe(move || {
                let complete = window
                    .document()
                    .is_some_and(|document| document.ready_state() == "complete");
                if complete {
                    start_panel(&engine, &listeners, &window);
                    return;
                }
                let (engine_for_load, listeners_for_load, window_for_load) =
                    (Rc::clone(&engine), Rc::clone(&listeners), window.clone());
                let on_load = EventListener::once(&window, "load", move |_event| {
                    start_panel(&engine_for_load, &listeners_for_load, &window_for_load);
                });
                listeners.borrow_mut().push(on_load);
            });
        }

        let image = match source {
            Some(source) => {
                let image = HtmlImageElement::new()?;
                let gate_for_load = Rc::clone(&gate);
                let on_load = EventListener::once(&image, "load", move |_event| {
                    gate_for_load.borrow_mut().notify_loaded();
                });
                listeners.borrow_mut().push(on_load);
                image.set_src(&source);
                // Cached images may never dispatch `load`.
                if image.complete() {
                    gate.borrow_mut().notify_loaded();
                }
                Some(image)
            }
            None => {
                warn!("background image has no source; starting without waiting");
                gate.borrow_mut().notify_loaded();
                None
            }
        };
        debug!("frosted panel mounted");

        Ok(FrostedPanel {
            engine,
            listeners,
            _gate: gate,
            _image: image,
        })
    }
}

impl Drop for FrostedPanel {
    fn drop(&mut self) {
        self.listeners.borrow_mut().clear();
    }
}
