//! Pure geometry helpers: shape outlines, connection ports, drag deltas.
//!
//! Everything here works in canvas units unless a name says otherwise.

use crate::model::{Element, ElementKind, EVENT_RADIUS};
use kurbo::{BezPath, Circle, Line, ParamCurveNearest, Point, Rect, Shape, Size, Vec2};
use smallvec::SmallVec;

/// Tolerance (canvas units) for hitting a connector line.
pub const CONNECTOR_HIT_TOLERANCE: f64 = 5.0;

/// Radius (canvas units) of a connection port's hit area.
pub const PORT_HIT_RADIUS: f64 = 6.0;

/// Diamond vertices (top, right, bottom, left) relative to the centre.
pub fn diamond_points(size: Size) -> [Point; 4] {
    let hw = size.width / 2.0;
    let hh = size.height / 2.0;
    [
        Point::new(0.0, -hh),
        Point::new(hw, 0.0),
        Point::new(0.0, hh),
        Point::new(-hw, 0.0),
    ]
}

/// The hit/draw outline of an element in canvas units.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Circle(Circle),
    Rect(Rect),
    /// Closed polygon.
    Polygon(SmallVec<[Point; 4]>),
    /// Open polyline (connectors).
    Polyline(SmallVec<[Point; 4]>),
}

impl Outline {
    /// Whether `p` lies inside (or, for polylines, within `tolerance` of) the outline.
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        match self {
            Outline::Circle(c) => c.contains(p),
            Outline::Rect(r) => r.contains(p),
            Outline::Polygon(points) => polygon_path(points).contains(p),
            Outline::Polyline(points) => distance_to_polyline(points, p) <= tolerance,
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounds(&self) -> Rect {
        match self {
            Outline::Circle(c) => c.bounding_box(),
            Outline::Rect(r) => *r,
            Outline::Polygon(points) | Outline::Polyline(points) => points_bounds(points),
        }
    }
}

/// Outline of a node or connector; `None` for unknown kinds.
pub fn outline_of(element: &Element) -> Option<Outline> {
    let center = element.position();
    let size = element.size();
    match element.kind {
        ElementKind::Start | ElementKind::End => {
            let radius = element
                .attribute
                .width
                .map(|w| w / 2.0)
                .unwrap_or(EVENT_RADIUS);
            Some(Outline::Circle(Circle::new(center, radius)))
        }
        ElementKind::Task => Some(Outline::Rect(Rect::from_center_size(center, size))),
        ElementKind::Decision => Some(Outline::Polygon(
            diamond_points(size)
                .iter()
                .map(|p| center + p.to_vec2())
                .collect(),
        )),
        ElementKind::Connector => Some(Outline::Polyline(element.attribute.points.clone())),
        ElementKind::Unknown(_) => None,
    }
}

/// Connection ports (top, right, bottom, left) of a node in canvas units.
/// Connectors and unknown kinds have none.
pub fn ports_of(element: &Element) -> SmallVec<[Point; 4]> {
    if !element.kind.is_node() {
        return SmallVec::new();
    }
    let c = element.position();
    let size = match element.kind {
        ElementKind::Start | ElementKind::End => {
            let d = element.attribute.width.unwrap_or(EVENT_RADIUS * 2.0);
            Size::new(d, d)
        }
        _ => element.size(),
    };
    diamond_points(size)
        .iter()
        .map(|p| c + p.to_vec2())
        .collect()
}

/// The port of `element` closest to `to`.
pub fn nearest_port(element: &Element, to: Point) -> Option<Point> {
    ports_of(element)
        .into_iter()
        .min_by(|a, b| (*a - to).hypot2().total_cmp(&(*b - to).hypot2()))
}

/// Movement between two screen points, converted to canvas units.
pub fn axis_delta(from: Point, to: Point, scale: f64) -> Vec2 {
    let scale = if scale > 0.0 { scale } else { 1.0 };
    (to - from) / scale
}

/// Shortest distance from `p` to an open polyline.
pub fn distance_to_polyline(points: &[Point], p: Point) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => only.distance(p),
        _ => points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]).nearest(p, 1e-6).distance_sq.sqrt())
            .fold(f64::INFINITY, f64::min),
    }
}

fn polygon_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

fn points_bounds(points: &[Point]) -> Rect {
    points
        .iter()
        .map(|p| Rect::from_points(*p, *p))
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ElementId;

    fn node(kind: ElementKind, x: f64, y: f64) -> Element {
        Element::node(ElementId::intern("g"), kind, Point::new(x, y), "")
    }

    #[test]
    fn diamond_is_centred() {
        let pts = diamond_points(Size::new(100.0, 60.0));
        assert_eq!(pts[0], Point::new(0.0, -30.0));
        assert_eq!(pts[1], Point::new(50.0, 0.0));
        assert_eq!(pts[2], Point::new(0.0, 30.0));
        assert_eq!(pts[3], Point::new(-50.0, 0.0));
    }

    #[test]
    fn decision_hit_excludes_corners() {
        let decision = node(ElementKind::Decision, 100.0, 100.0);
        let outline = outline_of(&decision).unwrap();
        assert!(outline.contains(Point::new(100.0, 100.0), 0.0));
        // Inside the bounding box but outside the diamond.
        assert!(!outline.contains(Point::new(155.0, 135.0), 0.0));
    }

    #[test]
    fn event_outline_is_circle() {
        let start = node(ElementKind::Start, 30.0, 30.0);
        let outline = outline_of(&start).unwrap();
        assert!(outline.contains(Point::new(30.0, 55.0), 0.0));
        assert!(!outline.contains(Point::new(55.0, 55.0), 0.0));
    }

    #[test]
    fn polyline_hit_uses_tolerance() {
        let points = [Point::new(0.0, 0.0), Point::new(100.0, 0.0)];
        assert!((distance_to_polyline(&points, Point::new(50.0, 3.0)) - 3.0).abs() < 1e-6);
        let outline = Outline::Polyline(points.iter().copied().collect());
        assert!(outline.contains(Point::new(50.0, 4.0), CONNECTOR_HIT_TOLERANCE));
        assert!(!outline.contains(Point::new(50.0, 9.0), CONNECTOR_HIT_TOLERANCE));
    }

    #[test]
    fn ports_sit_on_outline_extremes() {
        let task = node(ElementKind::Task, 0.0, 0.0);
        let ports = ports_of(&task);
        assert_eq!(ports.len(), 4);
        assert_eq!(ports[1], Point::new(60.0, 0.0));
        assert_eq!(
            nearest_port(&task, Point::new(0.0, 200.0)),
            Some(Point::new(0.0, 30.0))
        );
    }

    #[test]
    fn axis_delta_divides_by_scale() {
        let d = axis_delta(Point::new(10.0, 10.0), Point::new(30.0, 50.0), 2.0);
        assert_eq!(d, Vec2::new(10.0, 20.0));
    }
}
