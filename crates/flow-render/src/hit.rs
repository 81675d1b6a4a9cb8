//! Hit testing: point → element lookup.
//!
//! Walks the elements in reverse paint order (topmost first). Ports win
//! over bodies and bodies over connectors, so a port drawn on top of a
//! connector's arrowhead is still grabbable.

use crate::controller::controller_for;
use flow_core::geometry::{CONNECTOR_HIT_TOLERANCE, PORT_HIT_RADIUS};
use flow_core::{ElementId, Graph, Point};

/// What lies under a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    /// A connection port of a node that may start a connector.
    Port { id: ElementId, point: Point },
    /// The body of a node.
    Body(ElementId),
    /// A connector line.
    Connector(ElementId),
}

impl Hit {
    pub fn id(&self) -> ElementId {
        match *self {
            Hit::Port { id, .. } | Hit::Body(id) | Hit::Connector(id) => id,
        }
    }
}

/// Find what lies at `p` (canvas units). Returns `None` for empty canvas.
///
/// Tolerances are fixed in screen pixels, so they shrink in canvas units
/// as the view zooms in.
pub fn hit_test(graph: &Graph, p: Point) -> Option<Hit> {
    let scale = if graph.scale > 0.0 { graph.scale } else { 1.0 };
    let port_radius_sq = (PORT_HIT_RADIUS / scale).powi(2);

    // Nodes topmost first; each node's ports before its own body.
    for element in graph.elements.iter().rev().filter(|e| e.kind.is_node()) {
        let Some(ctrl) = controller_for(&element.kind) else {
            continue;
        };
        if element.kind.can_be_source()
            && let Some(point) = ctrl
                .connection_points(element)
                .into_iter()
                .find(|port| (*port - p).hypot2() <= port_radius_sq)
        {
            return Some(Hit::Port {
                id: element.id,
                point,
            });
        }
        if ctrl
            .outline(element)
            .is_some_and(|outline| outline.contains(p, 0.0))
        {
            return Some(Hit::Body(element.id));
        }
    }

    let tolerance = CONNECTOR_HIT_TOLERANCE / scale;
    graph
        .elements
        .iter()
        .rev()
        .filter(|e| e.is_connector())
        .find(|e| {
            controller_for(&e.kind)
                .and_then(|ctrl| ctrl.outline(e))
                .is_some_and(|outline| outline.contains(p, tolerance))
        })
        .map(|e| Hit::Connector(e.id))
}

/// The topmost node whose body contains `p` (canvas units). Ports and
/// connectors are ignored; this is the drop-target lookup used while
/// drawing a connector.
pub fn body_at(graph: &Graph, p: Point) -> Option<ElementId> {
    graph
        .elements
        .iter()
        .rev()
        .filter(|e| e.kind.is_node())
        .find(|e| {
            controller_for(&e.kind)
                .and_then(|ctrl| ctrl.outline(e))
                .is_some_and(|outline| outline.contains(p, 0.0))
        })
        .map(|e| e.id)
}

/// Hit test at a screen point, applying the graph's pan and zoom.
pub fn element_at(graph: &Graph, screen: Point) -> Option<Hit> {
    hit_test(graph, graph.to_canvas(screen))
}
