//! WASM bridge for Flowline: exposes the flow container to JavaScript.
//!
//! Built with `wasm-pack build --target web`. The host owns the DOM: it
//! forwards pointer, wheel and keyboard events, then replaces the canvas
//! markup with `render_svg()` after each call.

use flow_core::{Element, ElementKind, FlowConfig, Point};
use flow_editor::{FlowContainer, FlowListener, HandleOutput, InputEvent, Modifiers};
use wasm_bindgen::prelude::*;

/// One editor instance bound to a host element.
#[wasm_bindgen]
pub struct FlowCanvas {
    container: FlowContainer,
}

#[wasm_bindgen]
impl FlowCanvas {
    /// Load a flowchart document. `config` is the host option object as
    /// JSON; an empty or malformed string falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(data: &str, config: &str) -> Self {
        console_setup();
        Self {
            container: FlowContainer::new(data, parse_config(config)),
        }
    }

    /// Register host callbacks. Each receives the affected element(s) as a
    /// JSON string: `onSelect(element | null)` and `onDelete(elements[])`.
    pub fn set_listener(&mut self, on_select: Option<js_sys::Function>, on_delete: Option<js_sys::Function>) {
        self.container.set_listener(Box::new(JsListener {
            on_select,
            on_delete,
        }));
    }

    /// Replace the document. Malformed input yields a blank flowchart.
    pub fn load(&mut self, data: &str) {
        self.container.load(data);
    }

    /// The persisted document as JSON.
    pub fn get_json(&self) -> String {
        self.container.to_json()
    }

    pub fn render_svg(&self) -> String {
        self.container.render_svg()
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.container.handle_event(&InputEvent::PointerDown {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.container.handle_event(&InputEvent::PointerMove { x, y });
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) {
        self.container.handle_event(&InputEvent::PointerUp { x, y });
    }

    pub fn click(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.container.handle_event(&InputEvent::Click {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    pub fn double_click(&mut self, x: f64, y: f64) {
        self.container.handle_event(&InputEvent::DoubleClick { x, y });
    }

    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
        self.container.handle_event(&InputEvent::Wheel { x, y, delta_y });
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Forward a `KeyboardEvent.key` value.
    pub fn key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.container.handle_event(&InputEvent::Key {
            key: key.to_string(),
            modifiers: modifiers(shift, ctrl, alt, meta),
        });
    }

    pub fn can_undo(&self) -> bool {
        self.container.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.container.can_redo()
    }

    pub fn undo(&mut self) {
        self.container.undo();
    }

    pub fn redo(&mut self) {
        self.container.redo();
    }

    // ─── Host options ────────────────────────────────────────────────────

    /// Apply a host option (an element option list or a graph option).
    /// Returns the outcome as JSON, or `{"error":"..."}`.
    pub fn handle(&mut self, option: &str) -> String {
        handle_result(self.container.handle_json(option))
    }

    /// Create a node of type `kind` (`task`, `decision`, ...) centred at a
    /// screen drop point. Returns `{"id":...}` or `{"error":"..."}`.
    pub fn drop_element(&mut self, kind: &str, x: f64, y: f64, text: &str) -> String {
        let value = match self
            .container
            .drop_element(ElementKind::from_tag(kind), Point::new(x, y), text)
        {
            Ok(id) => serde_json::json!({ "id": id }),
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };
        value.to_string()
    }

    /// IDs of the selected elements as a JSON array.
    pub fn selected_ids(&self) -> String {
        serde_json::to_string(self.container.selection().ids()).unwrap_or_else(|_| "[]".into())
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.container.set_read_only(read_only);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn parse_config(config: &str) -> FlowConfig {
    if config.trim().is_empty() {
        return FlowConfig::default();
    }
    serde_json::from_str(config).unwrap_or_else(|err| {
        log::warn!("ignoring malformed config: {err}");
        FlowConfig::default()
    })
}

fn handle_result(result: Result<HandleOutput, flow_core::FlowError>) -> String {
    let value = match result {
        Ok(output) => serde_json::to_value(&output)
            .unwrap_or_else(|err| serde_json::json!({ "error": err.to_string() })),
        Err(err) => serde_json::json!({ "error": err.to_string() }),
    };
    value.to_string()
}

/// Forwards container notifications to JS callbacks.
struct JsListener {
    on_select: Option<js_sys::Function>,
    on_delete: Option<js_sys::Function>,
}

impl JsListener {
    fn call(callback: &Option<js_sys::Function>, payload: String) {
        let Some(callback) = callback else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
            log::error!("host callback threw: {err:?}");
        }
    }
}

impl FlowListener for JsListener {
    fn on_select(&mut self, element: Option<&Element>) {
        Self::call(&self.on_select, element_json(&element));
    }

    fn on_delete(&mut self, elements: &[Element]) {
        Self::call(&self.on_delete, element_json(&elements));
    }
}

fn element_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".into())
}

// ─── Console ─────────────────────────────────────────────────────────────

/// Routes panics and `log` records to the browser console. No-op off wasm.
fn console_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SETUP: Once = Once::new();
        SETUP.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Flowline WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&CONSOLE).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
static CONSOLE: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            _ => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}
