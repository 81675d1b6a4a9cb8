//! Core data model for flowcharts.
//!
//! A flowchart is an ordered list of [`Element`]s (nodes and the
//! connectors between them) plus the viewport (pan offset and scale) and
//! the editor's interaction status. Element order is paint order: later
//! elements sit on top and win hit tests.
//!
//! Node positions are element centres in canvas units. The viewport maps
//! canvas units to screen pixels as `screen = pan + canvas * scale`.

use crate::id::ElementId;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;

// ─── Element kinds ───────────────────────────────────────────────────────

/// The closed set of element types the editor knows how to draw.
///
/// Tags the editor does not recognise survive as `Unknown` so a document
/// written by a newer host round-trips; such elements are never drawn,
/// hit, or connected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Start event (entry point of the flow).
    Start,
    /// End event.
    End,
    /// A unit of work.
    Task,
    /// A branch point, drawn as a diamond.
    Decision,
    /// A directed edge between two nodes.
    Connector,
    Unknown(String),
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "start" => ElementKind::Start,
            "end" => ElementKind::End,
            "task" => ElementKind::Task,
            "decision" => ElementKind::Decision,
            "connector" => ElementKind::Connector,
            other => ElementKind::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Start => "start",
            ElementKind::End => "end",
            ElementKind::Task => "task",
            ElementKind::Decision => "decision",
            ElementKind::Connector => "connector",
            ElementKind::Unknown(tag) => tag,
        }
    }

    /// Start and end events. Events cannot be deleted or opened for editing.
    pub fn is_event(&self) -> bool {
        matches!(self, ElementKind::Start | ElementKind::End)
    }

    /// Drawable, connectable nodes (everything except connectors and unknowns).
    pub fn is_node(&self) -> bool {
        matches!(
            self,
            ElementKind::Start | ElementKind::End | ElementKind::Task | ElementKind::Decision
        )
    }

    pub fn can_be_source(&self) -> bool {
        matches!(
            self,
            ElementKind::Start | ElementKind::Task | ElementKind::Decision
        )
    }

    pub fn can_be_target(&self) -> bool {
        matches!(
            self,
            ElementKind::End | ElementKind::Task | ElementKind::Decision
        )
    }

    /// Default footprint of a node kind; `None` for connectors and unknowns.
    pub fn default_size(&self) -> Option<Size> {
        match self {
            ElementKind::Start | ElementKind::End => {
                Some(Size::new(EVENT_RADIUS * 2.0, EVENT_RADIUS * 2.0))
            }
            ElementKind::Task => Some(Size::new(120.0, 60.0)),
            ElementKind::Decision => Some(Size::new(120.0, 80.0)),
            ElementKind::Connector | ElementKind::Unknown(_) => None,
        }
    }
}

/// Radius of start/end event circles.
pub const EVENT_RADIUS: f64 = 30.0;

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for ElementKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for ElementKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ElementKind::from_tag(&tag))
    }
}

// ─── Element status ──────────────────────────────────────────────────────

/// Run-state decoration of an element (drives marker and class styling).
///
/// Unrecognised states are kept verbatim so they round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ElementStatus {
    #[default]
    Default,
    Disabled,
    Success,
    Process,
    Pause,
    Error,
    Unknown(String),
}

impl ElementStatus {
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| ElementStatus::Unknown(tag.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementStatus::Unknown(tag) => tag,
            known => known.marker(),
        }
    }

    /// Arrow marker variant. Unknown states use the default marker.
    pub fn marker(&self) -> &'static str {
        match self {
            ElementStatus::Default | ElementStatus::Unknown(_) => "default",
            ElementStatus::Disabled => "disabled",
            ElementStatus::Success => "success",
            ElementStatus::Process => "process",
            ElementStatus::Pause => "pause",
            ElementStatus::Error => "error",
        }
    }

    /// One of the known states; `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "default" => Some(ElementStatus::Default),
            "disabled" => Some(ElementStatus::Disabled),
            "success" => Some(ElementStatus::Success),
            "process" => Some(ElementStatus::Process),
            "pause" => Some(ElementStatus::Pause),
            "error" => Some(ElementStatus::Error),
            _ => None,
        }
    }
}

impl Serialize for ElementStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ElementStatus::from_tag(&tag))
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// Per-element attributes as stored in the JSON document.
///
/// Keys the editor does not interpret are kept in `extra` and written
/// back untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Connector source element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ElementId>,
    /// Connector target element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementId>,
    /// Connector polyline: source anchor first, target anchor last.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub points: SmallVec<[Point; 4]>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Transient per-gesture decoration. Never persisted; cleared by
/// [`Graph::reset`] when a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureFlags {
    /// The element is being dragged.
    pub dragging: bool,
    /// The element is under the cursor while a connector is being drawn.
    pub link_candidate: bool,
}

// ─── Elements ────────────────────────────────────────────────────────────

/// A node or connector placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(default)]
    pub attribute: Attribute,
    #[serde(default)]
    pub status: ElementStatus,
    #[serde(skip)]
    pub flags: GestureFlags,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            attribute: Attribute::default(),
            status: ElementStatus::default(),
            flags: GestureFlags::default(),
        }
    }

    /// A node centred at `at`.
    pub fn node(id: ElementId, kind: ElementKind, at: Point, text: &str) -> Self {
        let mut element = Self::new(id, kind);
        element.attribute.x = at.x;
        element.attribute.y = at.y;
        element.attribute.text = text.to_string();
        element
    }

    /// A connector from `source` to `target` along `points`.
    pub fn connector(
        id: ElementId,
        source: ElementId,
        target: ElementId,
        points: SmallVec<[Point; 4]>,
    ) -> Self {
        let mut element = Self::new(id, ElementKind::Connector);
        element.attribute.source = Some(source);
        element.attribute.target = Some(target);
        element.attribute.points = points;
        element
    }

    pub fn is_connector(&self) -> bool {
        self.kind == ElementKind::Connector
    }

    /// Centre of the element in canvas units.
    pub fn position(&self) -> Point {
        Point::new(self.attribute.x, self.attribute.y)
    }

    /// Footprint: explicit `width`/`height` attributes override the kind default.
    pub fn size(&self) -> Size {
        let default = self.kind.default_size().unwrap_or(Size::ZERO);
        Size::new(
            self.attribute.width.unwrap_or(default.width),
            self.attribute.height.unwrap_or(default.height),
        )
    }

    /// Whether this connector has `id` at either end.
    pub fn references(&self, id: ElementId) -> bool {
        self.is_connector()
            && (self.attribute.source == Some(id) || self.attribute.target == Some(id))
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.attribute.x += delta.x;
        self.attribute.y += delta.y;
    }
}

// ─── Graph ───────────────────────────────────────────────────────────────

/// The editor's interaction mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStatus {
    #[default]
    Edit,
    /// An element is being dragged.
    Move,
    /// A connector is being drawn.
    Link,
    Readonly,
}

impl GraphStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphStatus::Edit => "edit",
            GraphStatus::Move => "move",
            GraphStatus::Link => "link",
            GraphStatus::Readonly => "readonly",
        }
    }

    /// The resting status for an editor with the given read-only flag.
    pub fn idle(read_only: bool) -> Self {
        if read_only {
            GraphStatus::Readonly
        } else {
            GraphStatus::Edit
        }
    }
}

/// The complete flowchart: elements plus viewport and status.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Elements in paint order.
    pub elements: Vec<Element>,
    /// Horizontal pan offset in screen pixels.
    pub x: f64,
    /// Vertical pan offset in screen pixels.
    pub y: f64,
    pub scale: f64,
    pub status: GraphStatus,
    /// Canvas height in screen pixels.
    pub height: f64,
}

impl Graph {
    /// An empty graph with an identity viewport.
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self {
            elements: Vec::new(),
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            status: GraphStatus::Edit,
            height,
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Nodes in paint order.
    pub fn nodes(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.kind.is_node())
    }

    /// Connectors in paint order.
    pub fn connectors(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.is_connector())
    }

    /// Connectors with `id` at either end.
    pub fn connectors_of(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(move |e| e.references(id))
    }

    /// Whether a connector already runs from `source` to `target`.
    pub fn is_connected(&self, source: ElementId, target: ElementId) -> bool {
        self.connectors().any(|c| {
            c.attribute.source == Some(source) && c.attribute.target == Some(target)
        })
    }

    /// First element of the given kind.
    pub fn first_of(&self, kind: &ElementKind) -> Option<&Element> {
        self.elements.iter().find(|e| &e.kind == kind)
    }

    /// A fresh id of the form `{prefix}_{n}` not used by any element.
    pub fn fresh_id(&self, prefix: &str) -> ElementId {
        loop {
            let id = ElementId::with_prefix(prefix);
            if !self.contains(id) {
                return id;
            }
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.status == GraphStatus::Readonly
    }

    /// Canvas → screen transform for the current pan and scale.
    pub fn view_transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.scale)
    }

    /// Map a screen point into canvas units.
    pub fn to_canvas(&self, screen: Point) -> Point {
        self.view_transform().inverse() * screen
    }

    /// Map a canvas point into screen pixels.
    pub fn to_screen(&self, canvas: Point) -> Point {
        self.view_transform() * canvas
    }

    /// Clear transient per-gesture flags on every element.
    pub fn reset(&mut self) {
        for element in &mut self.elements {
            element.flags = GestureFlags::default();
        }
    }
}
