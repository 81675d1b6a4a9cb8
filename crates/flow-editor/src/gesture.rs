//! Gesture state machine.
//!
//! A press classifies into one of three gestures by what lies under the
//! pointer; moves advance it; release ends it.
//!
//! ```text
//!            press(empty)      ┌─────────┐
//!        ┌──────────────────▶  │ panning │ ──┐
//!        │   press(body)       ├─────────┤   │
//!  idle ─┼──────────────────▶  │ moving  │ ──┼── release ──▶ idle
//!        │   press(port)       ├─────────┤   │
//!        └──────────────────▶  │ linking │ ──┘
//!                              └─────────┘
//! ```
//!
//! A press on a connector line starts nothing. In read-only mode every
//! press pans.

use flow_core::geometry::axis_delta;
use flow_core::{ElementId, Graph, GraphStatus, Point, Vec2};
use flow_render::{Hit, element_at};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Dragging the empty canvas.
    Pan,
    /// Dragging a node.
    Element,
    /// Drawing a connector from a port.
    Line,
}

/// An in-flight gesture. Points are screen pixels except `port`.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub kind: MoveKind,
    /// Where the press happened.
    pub start: Point,
    /// Cursor position at the previous step.
    pub last: Point,
    /// Latest cursor position.
    pub end: Point,
    /// Set by the first pointer move after the press.
    pub active: bool,
    /// Dragged element or connector source.
    pub target: Option<ElementId>,
    /// Anchor port of a connector being drawn, in canvas units.
    pub port: Option<Point>,
}

impl Move {
    fn new(kind: MoveKind, at: Point) -> Self {
        Self {
            kind,
            start: at,
            last: at,
            end: at,
            active: false,
            target: None,
            port: None,
        }
    }

    /// Classify a press at `screen`. `None` means the press starts no gesture.
    pub fn classify(graph: &Graph, screen: Point) -> Option<Move> {
        if graph.is_read_only() {
            return Some(Move::new(MoveKind::Pan, screen));
        }
        match element_at(graph, screen) {
            None => Some(Move::new(MoveKind::Pan, screen)),
            Some(Hit::Body(id)) => Some(Move {
                target: Some(id),
                ..Move::new(MoveKind::Element, screen)
            }),
            Some(Hit::Port { id, point }) => Some(Move {
                target: Some(id),
                port: Some(point),
                ..Move::new(MoveKind::Line, screen)
            }),
            Some(Hit::Connector(_)) => None,
        }
    }

    /// Record a new cursor position and return the screen-space delta
    /// since the previous one.
    pub fn advance(&mut self, screen: Point) -> Vec2 {
        self.active = true;
        self.end = screen;
        let delta = self.end - self.last;
        self.last = self.end;
        delta
    }

    /// The graph status while this gesture is active.
    pub fn status(&self) -> Option<GraphStatus> {
        match self.kind {
            MoveKind::Pan => None,
            MoveKind::Element => Some(GraphStatus::Move),
            MoveKind::Line => Some(GraphStatus::Link),
        }
    }
}

/// What one pointer move asks the container to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Shift the pan offset by a screen delta.
    Pan(Vec2),
    /// Shift an element by a canvas delta.
    Element { id: ElementId, delta: Vec2 },
    /// Redraw the guide line from `anchor` to `cursor` (canvas units).
    Line {
        source: ElementId,
        anchor: Point,
        cursor: Point,
    },
}

/// Holds at most one gesture, from press to release.
#[derive(Debug, Default)]
pub struct GestureMachine {
    current: Option<Move>,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Move> {
        self.current.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Start a gesture. Any unreleased gesture is dropped.
    pub fn press(&mut self, graph: &Graph, screen: Point) -> Option<&Move> {
        self.current = Move::classify(graph, screen);
        if let Some(mv) = &self.current {
            log::debug!("gesture start: {:?} on {:?}", mv.kind, mv.target);
        }
        self.current.as_ref()
    }

    /// Advance the gesture to `screen`. `None` when idle.
    pub fn drag(&mut self, graph: &Graph, screen: Point) -> Option<Step> {
        let mv = self.current.as_mut()?;
        let delta = mv.advance(screen);
        let step = match (mv.kind, mv.target) {
            (MoveKind::Pan, _) => Step::Pan(delta),
            (MoveKind::Element, Some(id)) => Step::Element {
                id,
                delta: axis_delta(Point::ORIGIN, Point::ORIGIN + delta, graph.scale),
            },
            (MoveKind::Line, Some(source)) => Step::Line {
                source,
                anchor: mv.port.unwrap_or_else(|| graph.to_canvas(mv.start)),
                cursor: graph.to_canvas(screen),
            },
            _ => return None,
        };
        log::trace!("gesture step: {step:?}");
        Some(step)
    }

    /// End the gesture, returning it.
    pub fn release(&mut self) -> Option<Move> {
        let mv = self.current.take();
        if let Some(mv) = &mv {
            log::debug!("gesture end: {:?} (active: {})", mv.kind, mv.active);
        }
        mv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::{Element, ElementKind};
    use pretty_assertions::assert_eq;

    fn graph() -> Graph {
        let mut graph = Graph::new(500.0);
        graph.elements.push(Element::node(
            ElementId::intern("g-task"),
            ElementKind::Task,
            Point::new(200.0, 100.0),
            "",
        ));
        graph
    }

    #[test]
    fn press_classifies_by_hit() {
        let g = graph();
        assert_eq!(
            Move::classify(&g, Point::new(10.0, 10.0)).map(|m| m.kind),
            Some(MoveKind::Pan)
        );
        assert_eq!(
            Move::classify(&g, Point::new(200.0, 100.0)).map(|m| m.kind),
            Some(MoveKind::Element)
        );
        let line = Move::classify(&g, Point::new(260.0, 100.0)).unwrap();
        assert_eq!(line.kind, MoveKind::Line);
        assert_eq!(line.port, Some(Point::new(260.0, 100.0)));
    }

    #[test]
    fn read_only_press_always_pans() {
        let mut g = graph();
        g.status = GraphStatus::Readonly;
        assert_eq!(
            Move::classify(&g, Point::new(200.0, 100.0)).map(|m| m.kind),
            Some(MoveKind::Pan)
        );
    }

    #[test]
    fn element_deltas_are_incremental_and_scaled() {
        let mut g = graph();
        g.scale = 2.0;
        let mut machine = GestureMachine::new();
        // Canvas (200, 100) at scale 2 is screen (400, 200).
        machine.press(&g, Point::new(400.0, 200.0));
        assert!(!machine.current().unwrap().active);

        let first = machine.drag(&g, Point::new(410.0, 200.0));
        let second = machine.drag(&g, Point::new(430.0, 220.0));
        let id = ElementId::intern("g-task");
        assert_eq!(
            first,
            Some(Step::Element {
                id,
                delta: Vec2::new(5.0, 0.0)
            })
        );
        assert_eq!(
            second,
            Some(Step::Element {
                id,
                delta: Vec2::new(10.0, 10.0)
            })
        );
        assert!(machine.current().unwrap().active);
    }

    #[test]
    fn pan_deltas_stay_in_screen_units() {
        let mut g = graph();
        g.scale = 2.0;
        let mut machine = GestureMachine::new();
        machine.press(&g, Point::new(5.0, 5.0));
        assert_eq!(
            machine.drag(&g, Point::new(25.0, 0.0)),
            Some(Step::Pan(Vec2::new(20.0, -5.0)))
        );
    }

    #[test]
    fn release_returns_to_idle() {
        let g = graph();
        let mut machine = GestureMachine::new();
        machine.press(&g, Point::new(5.0, 5.0));
        let mv = machine.release().unwrap();
        assert_eq!(mv.kind, MoveKind::Pan);
        assert!(machine.is_idle());
        assert_eq!(machine.drag(&g, Point::new(9.0, 9.0)), None);
    }
}
