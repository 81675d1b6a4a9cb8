//! The flow container: one editor instance.
//!
//! Owns the engine, the selection, the in-flight gesture, and the undo
//! stack, and turns input events into mutations. Rejected mutations are
//! logged and dropped; no input can put the container in an error state.

use crate::commands::CommandStack;
use crate::element::{is_active_element, number};
use crate::engine::{Applied, Engine, GraphMutation};
use crate::gesture::{GestureMachine, MoveKind, Step};
use crate::input::{InputEvent, Modifiers};
use crate::line::{draw_connector, mark_link_candidate};
use crate::options::{
    ElementAction, ElementOption, GraphAction, GraphOption, HandleOption, HandleOutput,
};
use crate::selection::Selection;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use flow_core::view::{self, Wheel, zoom_to};
use flow_core::{
    Element, ElementId, ElementKind, FlowConfig, FlowError, Graph, GraphStatus, Point,
    parse_graph, to_json, validate,
};
use flow_render::{element_at, render_svg};
use serde_json::Value;

/// Host notifications.
pub trait FlowListener {
    /// An element was opened (double-click), or the selection was cleared
    /// by clicking empty canvas (`None`).
    fn on_select(&mut self, _element: Option<&Element>) {}

    /// Elements were removed by the user. Includes cascaded connectors.
    fn on_delete(&mut self, _elements: &[Element]) {}
}

/// A listener that ignores everything.
pub struct NoopListener;

impl FlowListener for NoopListener {}

pub struct FlowContainer {
    engine: Engine,
    selection: Selection,
    gestures: GestureMachine,
    commands: CommandStack,
    config: FlowConfig,
    listener: Box<dyn FlowListener>,
    /// Guide line of a connector being drawn, in canvas units.
    guide: Option<[Point; 2]>,
    /// The last gesture dragged; the click the host fires after it is ignored.
    suppress_click: bool,
}

impl FlowContainer {
    /// Load a document. Unreadable input yields a blank flowchart.
    pub fn new(data: &str, config: FlowConfig) -> Self {
        let graph = parse_graph(data, &config);
        Self {
            engine: Engine::new(graph),
            selection: Selection::new(),
            gestures: GestureMachine::new(),
            commands: CommandStack::default(),
            config,
            listener: Box::new(NoopListener),
            guide: None,
            suppress_click: false,
        }
    }

    pub fn with_listener(mut self, listener: impl FlowListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn set_listener(&mut self, listener: Box<dyn FlowListener>) {
        self.listener = listener;
    }

    pub fn graph(&self) -> &Graph {
        self.engine.graph()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn guide(&self) -> Option<[Point; 2]> {
        self.guide
    }

    pub fn gestures(&self) -> &GestureMachine {
        &self.gestures
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    /// Replace the document. Selection and history are cleared.
    pub fn load(&mut self, data: &str) {
        self.engine.replace(parse_graph(data, &self.config));
        self.selection.clear();
        self.commands.clear();
        self.gestures.release();
        self.guide = None;
    }

    pub fn to_json(&self) -> String {
        to_json(self.graph())
    }

    pub fn render_svg(&self) -> String {
        render_svg(self.graph(), self.selection.ids(), self.guide)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch one input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.pointer_down(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::Click { x, y, modifiers } => self.click(Point::new(*x, *y), *modifiers),
            InputEvent::DoubleClick { .. } => self.double_click(),
            InputEvent::Wheel { x, y, delta_y } => self.wheel(Wheel {
                x: *x,
                y: *y,
                delta_y: *delta_y,
            }),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers),
        }
    }

    pub fn pointer_down(&mut self, screen: Point) {
        // A release outside the host element never reaches us.
        self.cancel_gesture();
        self.suppress_click = false;
        let Some(mv) = self.gestures.press(self.engine.graph(), screen) else {
            return;
        };
        let (kind, status) = (mv.kind, mv.status());
        if let Some(status) = status {
            self.engine.update(|g| g.status = status);
        }
        if kind == MoveKind::Element {
            self.commands.begin_batch(&self.engine, "move element");
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let Some(step) = self.gestures.drag(self.engine.graph(), screen) else {
            return;
        };
        match step {
            Step::Pan(delta) => self.engine.update(|g| view::pan(g, delta)),
            Step::Element { id, delta } => {
                let moved = self.commands.execute(
                    &mut self.engine,
                    GraphMutation::MoveElement { id, delta },
                    "move element",
                );
                match moved {
                    Ok(_) => self.engine.update(|g| {
                        if let Some(element) = g.get_mut(id) {
                            element.flags.dragging = true;
                        }
                    }),
                    Err(err) => log::debug!("move rejected: {err}"),
                }
            }
            Step::Line {
                source,
                anchor: _,
                cursor,
            } => {
                self.guide = self
                    .gestures
                    .current()
                    .and_then(|mv| draw_connector(mv, cursor));
                self.engine
                    .update(|g| mark_link_candidate(g, source, cursor));
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        let Some(mv) = self.gestures.release() else {
            return;
        };
        self.suppress_click = mv.active;

        match mv.kind {
            MoveKind::Line => {
                self.guide = None;
                if let (Some(source), Some(port)) = (mv.target, mv.port) {
                    let cursor = self.engine.graph().to_canvas(screen);
                    if let Err(err) = self.commands.execute(
                        &mut self.engine,
                        GraphMutation::Connect {
                            source,
                            port,
                            cursor,
                        },
                        "connect",
                    ) {
                        log::debug!("connector discarded: {err}");
                    }
                }
            }
            MoveKind::Element => self.commands.end_batch(&self.engine),
            MoveKind::Pan => {}
        }

        if self.engine.graph().status != GraphStatus::Edit {
            let idle = GraphStatus::idle(self.config.read_only);
            self.engine.update(|g| {
                g.status = idle;
                g.reset();
            });
        }
    }

    /// Drop an in-flight gesture without committing it. An open drag keeps
    /// the moves made so far as one undo step.
    pub fn cancel_gesture(&mut self) {
        let Some(mv) = self.gestures.release() else {
            return;
        };
        log::debug!("cancelled {:?} gesture", mv.kind);
        if mv.kind == MoveKind::Element {
            self.commands.end_batch(&self.engine);
        }
        self.guide = None;
        let idle = GraphStatus::idle(self.config.read_only);
        self.engine.update(|g| {
            g.status = idle;
            g.reset();
        });
    }

    pub fn click(&mut self, screen: Point, modifiers: Modifiers) {
        if std::mem::take(&mut self.suppress_click) {
            return;
        }
        match element_at(self.engine.graph(), screen) {
            Some(hit) => self
                .selection
                .click(self.engine.graph(), hit.id(), modifiers),
            None => {
                self.selection.clear();
                self.listener.on_select(None);
            }
        }
    }

    /// Open the first selected element. Events open as `None`.
    pub fn double_click(&mut self) {
        let Some(first) = self.selection.first() else {
            return;
        };
        let element = self
            .engine
            .graph()
            .get(first)
            .filter(|e| !e.kind.is_event());
        self.listener.on_select(element);
    }

    pub fn wheel(&mut self, wheel: Wheel) {
        let zoom = self.config.zoom;
        self.engine.update(|g| view::zoom(g, wheel, &zoom));
    }

    pub fn key(&mut self, key: &str, modifiers: Modifiers) {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return;
        };
        log::debug!("shortcut {key} → {action:?}");
        match action {
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Deselect => self.selection.clear(),
            ShortcutAction::SelectAll => self.selection.select_all(self.engine.graph()),
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::ZoomIn => self.zoom_step(-1.0),
            ShortcutAction::ZoomOut => self.zoom_step(1.0),
            ShortcutAction::ZoomReset => self.engine.update(|g| zoom_to(g, 1.0, Point::ORIGIN)),
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Remove every selected element except start/end events, notifying
    /// the listener with everything removed.
    pub fn delete_selected(&mut self) {
        if let Err(err) = self.editable() {
            log::debug!("delete ignored: {err}");
            return;
        }
        if !self.gestures.is_idle() {
            return;
        }
        let ids: Vec<ElementId> = self
            .engine
            .graph()
            .elements
            .iter()
            .filter(|e| is_active_element(e, &self.selection) && !e.kind.is_event())
            .map(|e| e.id)
            .collect();
        if ids.is_empty() {
            return;
        }

        match self.commands.execute(
            &mut self.engine,
            GraphMutation::DeleteElements { ids },
            "delete",
        ) {
            Ok(Applied::Deleted(removed)) => {
                self.engine.update(Graph::reset);
                self.selection.clear();
                self.listener.on_delete(&removed);
            }
            Ok(_) => {}
            Err(err) => log::debug!("delete rejected: {err}"),
        }
    }

    pub fn undo(&mut self) {
        if self.config.read_only || !self.gestures.is_idle() {
            return;
        }
        if self.commands.undo(&mut self.engine).is_some() {
            self.selection.retain_existing(self.engine.graph());
        }
    }

    pub fn redo(&mut self) {
        if self.config.read_only || !self.gestures.is_idle() {
            return;
        }
        if self.commands.redo(&mut self.engine).is_some() {
            self.selection.retain_existing(self.engine.graph());
        }
    }

    /// Place a new node of `kind` centred at a screen drop point.
    pub fn drop_element(
        &mut self,
        kind: ElementKind,
        screen: Point,
        text: &str,
    ) -> Result<ElementId, FlowError> {
        self.editable()?;
        let at = self.engine.graph().to_canvas(screen);
        let applied = self.commands.execute(
            &mut self.engine,
            GraphMutation::CreateElement {
                kind,
                at,
                text: text.to_string(),
            },
            "create element",
        )?;
        match applied {
            Applied::Created(id) => {
                self.selection.replace(id);
                Ok(id)
            }
            _ => Err(FlowError::invalid("type", "nothing was created")),
        }
    }

    /// User edits are refused in read-only mode; host options are not.
    fn editable(&self) -> Result<(), FlowError> {
        if self.config.read_only {
            Err(FlowError::ReadOnly)
        } else {
            Ok(())
        }
    }

    fn zoom_step(&mut self, notches: f64) {
        let zoom = self.config.zoom;
        let wheel = Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: notches * 100.0,
        };
        self.engine.update(|g| view::zoom(g, wheel, &zoom));
    }

    // ─── Host options ────────────────────────────────────────────────────

    /// Apply a host option.
    pub fn handle(&mut self, option: HandleOption) -> Result<HandleOutput, FlowError> {
        let result = match option {
            HandleOption::Elements(options) => self.handle_elements(options),
            HandleOption::Graph(option) => self.handle_graph(option),
        };
        if let Err(err) = &result {
            log::debug!("host option rejected: {err}");
        }
        result
    }

    /// [`handle`](Self::handle) for a JSON-encoded option.
    pub fn handle_json(&mut self, json: &str) -> Result<HandleOutput, FlowError> {
        self.handle(HandleOption::from_json(json)?)
    }

    fn handle_elements(&mut self, options: Vec<ElementOption>) -> Result<HandleOutput, FlowError> {
        let mut mutations = Vec::with_capacity(options.len());
        for option in options {
            let ids = match option.data.id {
                Some(id) => vec![id],
                None => self.selection.ids().to_vec(),
            };
            match option.action {
                ElementAction::Create => {
                    mutations.push(self.create_mutation(option.data.id, option.data.value)?)
                }
                ElementAction::Update => {
                    let field = option.data.field()?;
                    mutations.extend(ids.into_iter().map(|id| GraphMutation::SetField {
                        id,
                        field: field.to_string(),
                        value: option.data.value.clone(),
                    }));
                }
                ElementAction::Delete if !ids.is_empty() => {
                    mutations.push(GraphMutation::DeleteElements { ids })
                }
                ElementAction::Delete => {}
            }
        }
        if mutations.is_empty() {
            return Ok(HandleOutput::Elements {
                created: Vec::new(),
                deleted: Vec::new(),
            });
        }

        let applied = self.commands.execute(
            &mut self.engine,
            GraphMutation::Batch(mutations),
            "host update",
        )?;
        self.selection.retain_existing(self.engine.graph());

        let mut created = Vec::new();
        let mut deleted = Vec::new();
        collect_applied(applied, &mut created, &mut deleted);
        Ok(HandleOutput::Elements { created, deleted })
    }

    fn create_mutation(&self, id: Option<ElementId>, value: Value) -> Result<GraphMutation, FlowError> {
        let Value::Object(mut object) = value else {
            return Err(FlowError::invalid("value", "expected an element object"));
        };
        if let Some(id) = id {
            object.insert("id".into(), serde_json::to_value(id)?);
        }
        if !object.contains_key("id") {
            let kind = object.get("type").and_then(Value::as_str).unwrap_or("element");
            let fresh = self.engine.graph().fresh_id(kind);
            object.insert("id".into(), Value::String(fresh.as_str().to_string()));
        }
        let element: Element = serde_json::from_value(Value::Object(object))?;
        Ok(GraphMutation::InsertElement {
            element: Box::new(element),
        })
    }

    fn handle_graph(&mut self, option: GraphOption) -> Result<HandleOutput, FlowError> {
        match option.action {
            GraphAction::Validate => Ok(HandleOutput::Issues(validate(self.engine.graph()))),
            GraphAction::Data => Ok(HandleOutput::Data(self.to_json())),
            GraphAction::Update => {
                let field = option.data.field()?;
                let value = &option.data.value;
                match field {
                    "x" => {
                        let x = number(field, value)?;
                        self.engine.update(|g| g.x = x);
                    }
                    "y" => {
                        let y = number(field, value)?;
                        self.engine.update(|g| g.y = y);
                    }
                    "scale" => {
                        let scale = number(field, value)?;
                        if scale <= 0.0 {
                            return Err(FlowError::invalid(field, "must be positive"));
                        }
                        let scale = self.config.zoom.clamp(scale);
                        self.engine.update(|g| g.scale = scale);
                    }
                    "height" => {
                        let height = number(field, value)?;
                        self.engine.update(|g| g.height = height);
                    }
                    "readOnly" => {
                        let read_only = value
                            .as_bool()
                            .ok_or_else(|| FlowError::invalid(field, "expected a boolean"))?;
                        self.set_read_only(read_only);
                    }
                    other => return Err(FlowError::UnknownField(other.to_string())),
                }
                Ok(HandleOutput::Updated)
            }
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
        self.cancel_gesture();
        let status = GraphStatus::idle(read_only);
        self.engine.update(|g| {
            g.status = status;
            g.reset();
        });
    }
}

fn collect_applied(applied: Applied, created: &mut Vec<ElementId>, deleted: &mut Vec<Element>) {
    match applied {
        Applied::Done => {}
        Applied::Created(id) => created.push(id),
        Applied::Deleted(removed) => deleted.extend(removed),
        Applied::Batch(all) => {
            for applied in all {
                collect_applied(applied, created, deleted);
            }
        }
    }
}
