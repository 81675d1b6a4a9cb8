//! Controller factory: element kind → drawing and geometry strategy.
//!
//! Each drawable kind has one controller. The table in [`controller_for`]
//! is an exhaustive `match`, so adding an `ElementKind` variant fails to
//! compile until it is given a controller (or explicitly none).

use flow_core::geometry::{self, Outline, diamond_points};
use flow_core::model::{Element, ElementKind, EVENT_RADIUS};
use flow_core::{Point, Size};
use smallvec::SmallVec;

/// Shape-specific behaviour for one element kind.
pub trait Controller: Sync {
    /// Kind-specific CSS class (e.g. `element-decision`).
    fn class_name(&self) -> &'static str;

    /// Outline in canvas units, used for hit testing.
    fn outline(&self, element: &Element) -> Option<Outline> {
        geometry::outline_of(element)
    }

    /// Outline vertices relative to the element centre. Empty for
    /// shapes that are not polygons.
    fn outline_points(&self, _element: &Element) -> SmallVec<[Point; 4]> {
        SmallVec::new()
    }

    /// Connection ports in canvas units.
    fn connection_points(&self, element: &Element) -> SmallVec<[Point; 4]> {
        geometry::ports_of(element)
    }

    /// Append the SVG for the shape, in element-local coordinates.
    fn render_shape(&self, element: &Element, out: &mut String);
}

/// Start and end events: circles.
pub struct EventController {
    class: &'static str,
}

impl Controller for EventController {
    fn class_name(&self) -> &'static str {
        self.class
    }

    fn render_shape(&self, element: &Element, out: &mut String) {
        let r = element
            .attribute
            .width
            .map(|w| w / 2.0)
            .unwrap_or(EVENT_RADIUS);
        out.push_str(&format!("<circle r=\"{r}\" />"));
    }
}

/// Tasks: rectangles.
pub struct TaskController;

impl Controller for TaskController {
    fn class_name(&self) -> &'static str {
        "element-task"
    }

    fn outline_points(&self, element: &Element) -> SmallVec<[Point; 4]> {
        let Size { width, height } = element.size();
        let (hw, hh) = (width / 2.0, height / 2.0);
        SmallVec::from_buf([
            Point::new(-hw, -hh),
            Point::new(hw, -hh),
            Point::new(hw, hh),
            Point::new(-hw, hh),
        ])
    }

    fn render_shape(&self, element: &Element, out: &mut String) {
        let Size { width, height } = element.size();
        out.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" rx=\"4\" ry=\"4\" />",
            -width / 2.0,
            -height / 2.0,
        ));
    }
}

/// Decisions: diamonds.
pub struct DecisionController;

impl Controller for DecisionController {
    fn class_name(&self) -> &'static str {
        "element-decision"
    }

    fn outline_points(&self, element: &Element) -> SmallVec<[Point; 4]> {
        SmallVec::from_buf(diamond_points(element.size()))
    }

    fn render_shape(&self, element: &Element, out: &mut String) {
        out.push_str(&format!(
            "<polygon points=\"{}\" />",
            points_attr(&self.outline_points(element))
        ));
    }
}

/// Connectors: polylines with an arrow marker coloured by status.
pub struct ConnectorController;

impl Controller for ConnectorController {
    fn class_name(&self) -> &'static str {
        "element-connector"
    }

    fn connection_points(&self, _element: &Element) -> SmallVec<[Point; 4]> {
        SmallVec::new()
    }

    fn render_shape(&self, element: &Element, out: &mut String) {
        out.push_str(&format!(
            "<polyline points=\"{}\" marker-end=\"url(#triangle-{})\" />",
            points_attr(&element.attribute.points),
            element.status.marker()
        ));
    }
}

static START: EventController = EventController {
    class: "element-start",
};
static END: EventController = EventController {
    class: "element-end",
};
static TASK: TaskController = TaskController;
static DECISION: DecisionController = DecisionController;
static CONNECTOR: ConnectorController = ConnectorController;

/// The controller for a kind. Unknown kinds have none and are neither
/// drawn nor hit.
pub fn controller_for(kind: &ElementKind) -> Option<&'static dyn Controller> {
    match kind {
        ElementKind::Start => Some(&START),
        ElementKind::End => Some(&END),
        ElementKind::Task => Some(&TASK),
        ElementKind::Decision => Some(&DECISION),
        ElementKind::Connector => Some(&CONNECTOR),
        ElementKind::Unknown(_) => None,
    }
}

/// Format points as an SVG `points` attribute value.
pub fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}
