//! Connector drawing: the guide line while linking, and committing the
//! connector on release.

use crate::gesture::Move;
use flow_core::geometry::nearest_port;
use flow_core::{Element, ElementId, EndpointRole, FlowError, Graph, Point};
use flow_render::body_at;
use smallvec::smallvec;

/// The guide line for an in-flight link gesture: anchor port to cursor,
/// both in canvas units. `None` unless `mv` is drawing a connector.
pub fn draw_connector(mv: &Move, cursor: Point) -> Option<[Point; 2]> {
    mv.port.map(|anchor| [anchor, cursor])
}

/// Check the connector policy for `source → target`.
pub fn check_connection(graph: &Graph, source: ElementId, target: ElementId) -> Result<(), FlowError> {
    if source == target {
        return Err(FlowError::SelfLoop(source));
    }
    let from = graph.get(source).ok_or(FlowError::ElementNotFound(source))?;
    let to = graph.get(target).ok_or(FlowError::ElementNotFound(target))?;
    if !from.kind.can_be_source() {
        return Err(FlowError::NotConnectable {
            kind: from.kind.clone(),
            role: EndpointRole::Source,
        });
    }
    if !to.kind.can_be_target() {
        return Err(FlowError::NotConnectable {
            kind: to.kind.clone(),
            role: EndpointRole::Target,
        });
    }
    if graph.is_connected(source, target) {
        return Err(FlowError::DuplicateConnector {
            from: source,
            to: target,
        });
    }
    Ok(())
}

/// Mark the node under `cursor` as a link candidate when it would be a
/// valid target for `source`. Clears the flag everywhere else.
pub fn mark_link_candidate(graph: &mut Graph, source: ElementId, cursor: Point) {
    let candidate = body_at(graph, cursor).filter(|t| check_connection(graph, source, *t).is_ok());
    for element in &mut graph.elements {
        element.flags.link_candidate = Some(element.id) == candidate;
    }
}

/// Commit a connector from `source` (anchored at `port`) to the node
/// under `cursor`. The target end snaps to the target's port nearest the
/// anchor.
pub fn complete_connector(
    graph: &mut Graph,
    source: ElementId,
    port: Point,
    cursor: Point,
) -> Result<ElementId, FlowError> {
    let target = body_at(graph, cursor).ok_or(FlowError::NoTarget)?;
    check_connection(graph, source, target)?;

    let anchor = graph
        .get(target)
        .and_then(|t| nearest_port(t, port))
        .unwrap_or(cursor);
    let id = graph.fresh_id("connector");
    graph
        .elements
        .push(Element::connector(id, source, target, smallvec![port, anchor]));
    log::debug!("connected {source} → {target} as {id}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::MoveKind;
    use flow_core::ElementKind;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> ElementId {
        ElementId::intern(s)
    }

    fn graph() -> Graph {
        let mut graph = Graph::new(500.0);
        let nodes = [
            ("ln-start", ElementKind::Start, 60.0),
            ("ln-task", ElementKind::Task, 250.0),
            ("ln-end", ElementKind::End, 450.0),
        ];
        for (name, kind, x) in nodes {
            graph
                .elements
                .push(Element::node(id(name), kind, Point::new(x, 100.0), ""));
        }
        graph
    }

    #[test]
    fn completes_onto_nearest_target_port() {
        let mut g = graph();
        let port = Point::new(90.0, 100.0);
        let cid = complete_connector(&mut g, id("ln-start"), port, Point::new(250.0, 110.0)).unwrap();
        let connector = g.get(cid).unwrap();
        assert_eq!(connector.attribute.source, Some(id("ln-start")));
        assert_eq!(connector.attribute.target, Some(id("ln-task")));
        assert_eq!(
            connector.attribute.points.as_slice(),
            &[port, Point::new(190.0, 100.0)]
        );
    }

    #[test]
    fn release_over_canvas_discards() {
        let mut g = graph();
        let before = g.clone();
        let err = complete_connector(&mut g, id("ln-start"), Point::new(90.0, 100.0), Point::new(250.0, 400.0));
        assert!(matches!(err, Err(FlowError::NoTarget)));
        assert_eq!(g, before);
    }

    #[test]
    fn policy_rejections() {
        let mut g = graph();
        assert!(matches!(
            check_connection(&g, id("ln-task"), id("ln-task")),
            Err(FlowError::SelfLoop(_))
        ));
        assert!(matches!(
            check_connection(&g, id("ln-end"), id("ln-task")),
            Err(FlowError::NotConnectable {
                role: EndpointRole::Source,
                ..
            })
        ));
        assert!(matches!(
            check_connection(&g, id("ln-task"), id("ln-start")),
            Err(FlowError::NotConnectable {
                role: EndpointRole::Target,
                ..
            })
        ));

        complete_connector(&mut g, id("ln-task"), Point::new(310.0, 100.0), Point::new(450.0, 100.0)).unwrap();
        assert!(matches!(
            check_connection(&g, id("ln-task"), id("ln-end")),
            Err(FlowError::DuplicateConnector { .. })
        ));
        // The reverse direction is a different pair, but ends never source.
        assert!(check_connection(&g, id("ln-end"), id("ln-task")).is_err());
    }

    #[test]
    fn link_candidate_only_for_valid_targets() {
        let mut g = graph();
        mark_link_candidate(&mut g, id("ln-task"), Point::new(450.0, 100.0));
        assert!(g.get(id("ln-end")).unwrap().flags.link_candidate);

        mark_link_candidate(&mut g, id("ln-task"), Point::new(60.0, 100.0));
        assert!(g.elements.iter().all(|e| !e.flags.link_candidate));
    }

    #[test]
    fn guide_runs_from_anchor_to_cursor() {
        let mv = Move {
            kind: MoveKind::Line,
            start: Point::ORIGIN,
            last: Point::ORIGIN,
            end: Point::ORIGIN,
            active: true,
            target: Some(id("ln-task")),
            port: Some(Point::new(310.0, 100.0)),
        };
        assert_eq!(
            draw_connector(&mv, Point::new(400.0, 120.0)),
            Some([Point::new(310.0, 100.0), Point::new(400.0, 120.0)])
        );
    }
}
