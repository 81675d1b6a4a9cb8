//! JSON persistence for flowcharts.
//!
//! The document is either an object `{elements, x?, y?, scale?, height?}` or
//! a bare array of elements. Parsing is forgiving: a document that cannot be
//! read yields a blank flowchart instead of an error, because the editor
//! must always come up with something to draw.

use crate::config::{FlowConfig, opt_number_or_string};
use crate::error::FlowError;
use crate::id::ElementId;
use crate::model::{Element, ElementKind, Graph, GraphStatus};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Horizontal position of a default start event.
const DEFAULT_START_X: f64 = 60.0;
/// Horizontal position of a default end event.
const DEFAULT_END_X: f64 = 540.0;

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    scale: Option<f64>,
    #[serde(default, deserialize_with = "opt_number_or_string")]
    height: Option<f64>,
}

#[derive(Serialize)]
struct GraphDocumentRef<'a> {
    elements: &'a [Element],
    x: f64,
    y: f64,
    scale: f64,
    height: f64,
}

/// Parse a graph document, falling back to a blank flowchart on any error.
pub fn parse_graph(data: &str, config: &FlowConfig) -> Graph {
    match try_parse_graph(data, config) {
        Ok(graph) => graph,
        Err(err) => {
            log::warn!("discarding unreadable graph document: {err}");
            blank_graph(config)
        }
    }
}

/// Parse a graph document, reporting malformed JSON.
///
/// Empty input is not an error: it yields a blank flowchart. Missing start
/// and end events are added, and events without text receive the
/// configured labels.
pub fn try_parse_graph(data: &str, config: &FlowConfig) -> Result<Graph, FlowError> {
    if data.trim().is_empty() {
        return Ok(blank_graph(config));
    }

    let value: serde_json::Value = serde_json::from_str(data)?;
    let doc = if value.is_array() {
        GraphDocument {
            elements: serde_json::from_value(value)?,
            x: None,
            y: None,
            scale: None,
            height: None,
        }
    } else {
        serde_json::from_value::<GraphDocument>(value)?
    };

    let mut graph = Graph::new(doc.height.unwrap_or(config.height));
    graph.x = doc.x.filter(|v| v.is_finite()).unwrap_or(0.0);
    graph.y = doc.y.filter(|v| v.is_finite()).unwrap_or(0.0);
    graph.scale = doc
        .scale
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(|s| config.zoom.clamp(s))
        .unwrap_or(1.0);
    graph.status = GraphStatus::idle(config.read_only);

    let mut seen = HashSet::new();
    for element in doc.elements {
        if seen.insert(element.id) {
            graph.elements.push(element);
        } else {
            log::warn!("dropping element with duplicate id {}", element.id);
        }
    }

    ensure_events(&mut graph, config);
    log::debug!(
        "parsed graph: {} elements, scale {}",
        graph.elements.len(),
        graph.scale
    );
    Ok(graph)
}

/// A flowchart with just a start and an end event.
pub fn blank_graph(config: &FlowConfig) -> Graph {
    let mut graph = Graph::new(config.height);
    graph.status = GraphStatus::idle(config.read_only);
    ensure_events(&mut graph, config);
    graph
}

/// Serialize a graph to its JSON document form.
pub fn to_json(graph: &Graph) -> String {
    let doc = GraphDocumentRef {
        elements: &graph.elements,
        x: graph.x,
        y: graph.y,
        scale: graph.scale,
        height: graph.height,
    };
    serde_json::to_string(&doc).unwrap_or_else(|_| "{}".to_string())
}

/// Add missing start/end events and label unlabelled ones.
fn ensure_events(graph: &mut Graph, config: &FlowConfig) {
    let mid_y = graph.height / 2.0;

    if graph.first_of(&ElementKind::Start).is_none() {
        let id = default_id(graph, "start");
        let start = Element::node(
            id,
            ElementKind::Start,
            Point::new(DEFAULT_START_X, mid_y),
            &config.start_text,
        );
        graph.elements.insert(0, start);
    }
    if graph.first_of(&ElementKind::End).is_none() {
        let id = default_id(graph, "end");
        let end = Element::node(
            id,
            ElementKind::End,
            Point::new(DEFAULT_END_X, mid_y),
            &config.over_text,
        );
        graph.elements.push(end);
    }

    for element in &mut graph.elements {
        if !element.attribute.text.is_empty() {
            continue;
        }
        match element.kind {
            ElementKind::Start => element.attribute.text = config.start_text.clone(),
            ElementKind::End => element.attribute.text = config.over_text.clone(),
            _ => {}
        }
    }
}

fn default_id(graph: &Graph, name: &str) -> ElementId {
    let id = ElementId::intern(name);
    if graph.contains(id) {
        graph.fresh_id(name)
    } else {
        id
    }
}
