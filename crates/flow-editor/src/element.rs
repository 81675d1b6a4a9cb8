//! Element logic: activity, moving, creating, deleting, field updates.
//!
//! All functions mutate a `&mut Graph` in place and are meant to run on a
//! draft inside [`Engine::apply`](crate::engine::Engine::apply), so an error
//! part-way through never reaches the live graph.

use crate::line::check_connection;
use crate::selection::Selection;
use flow_core::{Element, ElementId, ElementKind, ElementStatus, FlowError, Graph, Point, Vec2};
use serde_json::Value;

/// Whether `element` is part of the selection.
pub fn is_active_element(element: &Element, selection: &Selection) -> bool {
    selection.contains(element.id)
}

/// Shift a node by `delta` (canvas units), dragging the matching endpoint
/// of every attached connector along with it.
pub fn move_element(graph: &mut Graph, id: ElementId, delta: Vec2) -> Result<(), FlowError> {
    let element = graph.get_mut(id).ok_or(FlowError::ElementNotFound(id))?;
    element.translate(delta);

    for connector in graph.elements.iter_mut().filter(|e| e.is_connector()) {
        let points = &mut connector.attribute.points;
        if connector.attribute.source == Some(id)
            && let Some(first) = points.first_mut()
        {
            *first += delta;
        }
        if connector.attribute.target == Some(id)
            && let Some(last) = points.last_mut()
        {
            *last += delta;
        }
    }
    Ok(())
}

/// Place a new node centred at `at` (canvas units) with a fresh id.
pub fn create_element(
    graph: &mut Graph,
    kind: ElementKind,
    at: Point,
    text: &str,
) -> Result<ElementId, FlowError> {
    if !kind.is_node() {
        return Err(FlowError::invalid(
            "type",
            format!("cannot place a `{kind}` element"),
        ));
    }
    let id = graph.fresh_id(kind.tag());
    graph.elements.push(Element::node(id, kind, at, text));
    log::debug!("created element {id}");
    Ok(id)
}

/// Append a fully-formed element. Its id must be unused, and a connector
/// must satisfy the connection policy.
pub fn insert_element(graph: &mut Graph, element: Element) -> Result<ElementId, FlowError> {
    if graph.contains(element.id) {
        return Err(FlowError::DuplicateId(element.id));
    }
    if element.is_connector()
        && let (Some(source), Some(target)) = (element.attribute.source, element.attribute.target)
    {
        check_connection(graph, source, target)?;
    }
    let id = element.id;
    graph.elements.push(element);
    Ok(id)
}

/// Remove an element and every connector attached to it.
///
/// Returns the removed elements, the requested one first.
pub fn delete_element(graph: &mut Graph, id: ElementId) -> Result<Vec<Element>, FlowError> {
    let index = graph.index_of(id).ok_or(FlowError::ElementNotFound(id))?;
    let mut removed = vec![graph.elements.remove(index)];

    let (attached, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut graph.elements)
        .into_iter()
        .partition(|e| e.references(id));
    graph.elements = kept;
    removed.extend(attached);

    log::debug!("deleted {id} and {} connector(s)", removed.len() - 1);
    Ok(removed)
}

/// Set one field of an element from a JSON value.
///
/// `x`/`y` move the element (attached connectors follow). `text`,
/// `width`, `height`, and `status` are typed. Structural fields are
/// refused. Anything else is stored as an extra attribute.
pub fn set_field(
    graph: &mut Graph,
    id: ElementId,
    field: &str,
    value: &Value,
) -> Result<(), FlowError> {
    let element = graph.get(id).ok_or(FlowError::ElementNotFound(id))?;
    match field {
        "x" | "y" => {
            let target = number(field, value)?;
            let current = element.position();
            let delta = if field == "x" {
                Vec2::new(target - current.x, 0.0)
            } else {
                Vec2::new(0.0, target - current.y)
            };
            move_element(graph, id, delta)
        }
        "id" | "type" | "source" | "target" | "points" => Err(FlowError::invalid(
            field,
            "structural fields cannot be updated",
        )),
        _ => {
            let element = graph.get_mut(id).ok_or(FlowError::ElementNotFound(id))?;
            match field {
                "text" => {
                    element.attribute.text = match value {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                }
                "width" => element.attribute.width = optional_number(field, value)?,
                "height" => element.attribute.height = optional_number(field, value)?,
                "status" => {
                    element.status = value
                        .as_str()
                        .and_then(ElementStatus::parse)
                        .ok_or_else(|| FlowError::invalid(field, format!("unknown status {value}")))?;
                }
                _ => {
                    element
                        .attribute
                        .extra
                        .insert(field.to_string(), value.clone());
                }
            }
            Ok(())
        }
    }
}

/// A finite number, given as a JSON number or a numeric string.
pub fn number(field: &str, value: &Value) -> Result<f64, FlowError> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
        .ok_or_else(|| FlowError::invalid(field, format!("expected a number, got {value}")))
}

fn optional_number(field: &str, value: &Value) -> Result<Option<f64>, FlowError> {
    match value {
        Value::Null => Ok(None),
        other => number(field, other).map(Some),
    }
}
