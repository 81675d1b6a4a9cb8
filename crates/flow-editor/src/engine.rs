//! The engine: owner of the authoritative graph.
//!
//! The graph lives behind an `Arc`. A mutation clones it into a draft,
//! applies, and swaps the draft in only if every step succeeded, so a
//! rejected mutation leaves no trace and snapshots handed to the undo stack
//! are shared pointers.
//!
//! Viewport, status, and gesture flags are not mutations: they change
//! through [`Engine::update`] and are never undone.

use crate::element::{create_element, delete_element, insert_element, move_element, set_field};
use crate::line::complete_connector;
use flow_core::{Element, ElementId, ElementKind, FlowError, Graph, Point, Vec2};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// An undoable edit of the graph's elements.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Shift a node (and attached connector endpoints) by a canvas delta.
    MoveElement { id: ElementId, delta: Vec2 },
    /// Place a new node with a fresh id.
    CreateElement {
        kind: ElementKind,
        at: Point,
        text: String,
    },
    /// Append a complete element with a caller-chosen id.
    InsertElement { element: Box<Element> },
    /// Delete elements and their connectors. Events are refused.
    DeleteElements { ids: Vec<ElementId> },
    /// Set one field of an element.
    SetField {
        id: ElementId,
        field: String,
        value: Value,
    },
    /// Commit a connector drawn from `source`'s `port` to the node under
    /// `cursor`.
    Connect {
        source: ElementId,
        port: Point,
        cursor: Point,
    },
    /// Apply several mutations as one; all succeed or none do.
    Batch(Vec<GraphMutation>),
}

/// What a successful mutation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Done,
    Created(ElementId),
    Deleted(Vec<Element>),
    Batch(Vec<Applied>),
}

pub struct Engine {
    graph: Arc<Graph>,
}

impl Engine {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// A shared handle on the current graph.
    pub fn snapshot(&self) -> Arc<Graph> {
        Arc::clone(&self.graph)
    }

    /// Apply a mutation atomically.
    ///
    /// Read-only mode is not checked here: it gates user input in the
    /// container, while the host may still push updates.
    pub fn apply(&mut self, mutation: GraphMutation) -> Result<Applied, FlowError> {
        let mut draft = Graph::clone(&self.graph);
        let applied = apply_to(&mut draft, mutation)?;
        self.graph = Arc::new(draft);
        Ok(applied)
    }

    /// Change non-undoable state (viewport, status, gesture flags) in place.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Graph) -> R) -> R {
        f(Arc::make_mut(&mut self.graph))
    }

    /// Swap in an earlier snapshot's elements, keeping the current
    /// viewport and status.
    pub fn restore(&mut self, snapshot: &Arc<Graph>) {
        let mut restored = Graph::clone(snapshot);
        restored.x = self.graph.x;
        restored.y = self.graph.y;
        restored.scale = self.graph.scale;
        restored.height = self.graph.height;
        restored.status = self.graph.status;
        restored.reset();
        self.graph = Arc::new(restored);
    }

    /// Replace the whole graph (host reload).
    pub fn replace(&mut self, graph: Graph) {
        self.graph = Arc::new(graph);
    }
}

fn apply_to(graph: &mut Graph, mutation: GraphMutation) -> Result<Applied, FlowError> {
    match mutation {
        GraphMutation::MoveElement { id, delta } => {
            move_element(graph, id, delta)?;
            Ok(Applied::Done)
        }
        GraphMutation::CreateElement { kind, at, text } => {
            create_element(graph, kind, at, &text).map(Applied::Created)
        }
        GraphMutation::InsertElement { element } => {
            insert_element(graph, *element).map(Applied::Created)
        }
        GraphMutation::DeleteElements { ids } => {
            let mut removed = Vec::new();
            let mut gone = HashSet::new();
            for id in ids {
                // Already swept up as a connector of an earlier deletion.
                if gone.contains(&id) {
                    continue;
                }
                let element = graph.get(id).ok_or(FlowError::ElementNotFound(id))?;
                if element.kind.is_event() {
                    return Err(FlowError::ProtectedEvent(id));
                }
                let batch = delete_element(graph, id)?;
                gone.extend(batch.iter().map(|e| e.id));
                removed.extend(batch);
            }
            Ok(Applied::Deleted(removed))
        }
        GraphMutation::SetField { id, field, value } => {
            set_field(graph, id, &field, &value)?;
            Ok(Applied::Done)
        }
        GraphMutation::Connect {
            source,
            port,
            cursor,
        } => complete_connector(graph, source, port, cursor).map(Applied::Created),
        GraphMutation::Batch(mutations) => mutations
            .into_iter()
            .map(|m| apply_to(graph, m))
            .collect::<Result<Vec<_>, _>>()
            .map(Applied::Batch),
    }
}
