//! SVG emission.
//!
//! Produces a self-contained `<svg>` string: arrow markers, then one
//! group per element in paint order inside a layer that carries the
//! viewport transform. Styling is left to the host's CSS; elements only
//! get class names.

use crate::controller::{controller_for, points_attr};
use flow_core::{Element, ElementId, ElementStatus, Graph, GraphStatus, Point};

const MARKER_STATUSES: [ElementStatus; 6] = [
    ElementStatus::Default,
    ElementStatus::Disabled,
    ElementStatus::Success,
    ElementStatus::Process,
    ElementStatus::Pause,
    ElementStatus::Error,
];

/// Render the graph as SVG markup.
///
/// `selection` marks elements active. `guide` is the in-progress
/// connector from its anchor port to the cursor, in canvas units.
pub fn render_svg(graph: &Graph, selection: &[ElementId], guide: Option<[Point; 2]>) -> String {
    let mut out = String::with_capacity(256 + graph.elements.len() * 160);
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"graph {}\" width=\"100%\" height=\"{}\">\n",
        graph.status.as_str(),
        graph.height
    ));

    out.push_str("  <defs>\n");
    for status in &MARKER_STATUSES {
        let name = status.marker();
        out.push_str(&format!(
            "    <marker id=\"triangle-{name}\" class=\"marker-{name}\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" /></marker>\n"
        ));
    }
    out.push_str("  </defs>\n");

    out.push_str(&format!(
        "  <g class=\"layer\" transform=\"translate({},{}) scale({})\">\n",
        graph.x, graph.y, graph.scale
    ));

    let show_ports = graph.status == GraphStatus::Edit || graph.status == GraphStatus::Link;
    for element in &graph.elements {
        render_element(element, selection.contains(&element.id), show_ports, &mut out);
    }

    if let Some(points) = guide {
        out.push_str(&format!(
            "    <polyline class=\"guide\" points=\"{}\" marker-end=\"url(#triangle-default)\" />\n",
            points_attr(&points)
        ));
    }

    out.push_str("  </g>\n</svg>\n");
    log::trace!("rendered {} elements to svg", graph.elements.len());
    out
}

fn render_element(element: &Element, active: bool, show_ports: bool, out: &mut String) {
    let Some(ctrl) = controller_for(&element.kind) else {
        return;
    };

    let mut class = format!(
        "element {} status-{}",
        ctrl.class_name(),
        escape_xml(element.status.as_str())
    );
    if active {
        class.push_str(" active");
    }
    if element.flags.dragging {
        class.push_str(" dragging");
    }
    if element.flags.link_candidate {
        class.push_str(" link-candidate");
    }

    let id = escape_xml(&element.id.to_string());
    if element.is_connector() {
        out.push_str(&format!("    <g class=\"{class}\" data-id=\"{id}\">"));
        ctrl.render_shape(element, out);
        if !element.attribute.text.is_empty()
            && let Some(at) = polyline_label_point(&element.attribute.points)
        {
            push_text(out, at, &element.attribute.text);
        }
        out.push_str("</g>\n");
        return;
    }

    let center = element.position();
    out.push_str(&format!(
        "    <g class=\"{class}\" data-id=\"{id}\" transform=\"translate({},{})\">",
        center.x, center.y
    ));
    ctrl.render_shape(element, out);
    if !element.attribute.text.is_empty() {
        push_text(out, Point::ORIGIN, &element.attribute.text);
    }
    if show_ports && element.kind.can_be_source() {
        for port in ctrl.connection_points(element) {
            let local = port - center;
            out.push_str(&format!(
                "<circle class=\"port\" cx=\"{}\" cy=\"{}\" r=\"4\" />",
                local.x, local.y
            ));
        }
    }
    out.push_str("</g>\n");
}

fn push_text(out: &mut String, at: Point, text: &str) {
    out.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>",
        at.x,
        at.y,
        escape_xml(text)
    ));
}

/// Midpoint of the middle segment, where a connector label sits.
fn polyline_label_point(points: &[Point]) -> Option<Point> {
    if points.len() < 2 {
        return points.first().copied();
    }
    let i = (points.len() - 1) / 2;
    Some(points[i].midpoint(points[i + 1]))
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::{FlowConfig, parse_graph};
    use pretty_assertions::assert_eq;

    fn graph() -> Graph {
        parse_graph(
            r#"{"elements":[
                {"id":"s","type":"start","attribute":{"x":60,"y":100}},
                {"id":"t","type":"task","attribute":{"x":200,"y":100,"text":"Review <draft> & sign"}},
                {"id":"e","type":"end","attribute":{"x":360,"y":100}},
                {"id":"c1","type":"connector","status":"success",
                 "attribute":{"source":"s","target":"t","points":[{"x":90,"y":100},{"x":140,"y":100}]}},
                {"id":"n","type":"lane"}
            ]}"#,
            &FlowConfig::default(),
        )
    }

    #[test]
    fn emits_markers_for_every_status() {
        let svg = render_svg(&graph(), &[], None);
        for status in MARKER_STATUSES {
            assert!(svg.contains(&format!("id=\"triangle-{}\"", status.marker())));
        }
        assert!(svg.contains("marker-end=\"url(#triangle-success)\""));
    }

    #[test]
    fn unknown_status_uses_default_marker() {
        let mut g = graph();
        g.get_mut(ElementId::intern("c1")).unwrap().status =
            ElementStatus::Unknown("running".into());
        let svg = render_svg(&g, &[], None);
        assert!(svg.contains("marker-end=\"url(#triangle-default)\""));
        assert!(svg.contains("status-running"));
        assert!(!svg.contains("triangle-running"));
    }

    #[test]
    fn escapes_text() {
        let svg = render_svg(&graph(), &[], None);
        assert!(svg.contains("Review &lt;draft&gt; &amp; sign"));
        assert!(!svg.contains("<draft>"));
    }

    #[test]
    fn layer_carries_viewport() {
        let mut g = graph();
        g.x = 12.0;
        g.y = -4.0;
        g.scale = 1.5;
        let svg = render_svg(&g, &[], None);
        assert!(svg.contains("transform=\"translate(12,-4) scale(1.5)\""));
    }

    #[test]
    fn selection_and_flags_become_classes() {
        let mut g = graph();
        g.get_mut(ElementId::intern("e")).unwrap().flags.link_candidate = true;
        let svg = render_svg(&g, &[ElementId::intern("t")], None);
        assert!(svg.contains("class=\"element element-task status-default active\""));
        assert!(svg.contains("class=\"element element-end status-default link-candidate\""));
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let svg = render_svg(&graph(), &[], None);
        assert!(!svg.contains("data-id=\"n\""));
        assert_eq!(svg.matches("class=\"element ").count(), 4);
    }

    #[test]
    fn ports_hidden_when_read_only() {
        let mut g = graph();
        assert!(render_svg(&g, &[], None).contains("class=\"port\""));
        g.status = GraphStatus::Readonly;
        assert!(!render_svg(&g, &[], None).contains("class=\"port\""));
    }

    #[test]
    fn guide_line_is_drawn() {
        let svg = render_svg(
            &graph(),
            &[],
            Some([Point::new(260.0, 100.0), Point::new(300.0, 140.0)]),
        );
        assert!(svg.contains("class=\"guide\" points=\"260,100 300,140\""));
    }

    #[test]
    fn connector_label_sits_mid_segment() {
        assert_eq!(
            polyline_label_point(&[
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 20.0)
            ]),
            Some(Point::new(5.0, 0.0))
        );
        assert_eq!(polyline_label_point(&[]), None);
    }
}
