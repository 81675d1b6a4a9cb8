//! Structural validation of a flowchart.
//!
//! Checks that the chart is a usable process: one entry, at least one
//! reachable exit, every node reachable from the entry, connectors attached
//! at both ends, and decisions that actually branch.

use crate::id::ElementId;
use crate::model::{ElementKind, Graph};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A structural problem found by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum ValidationIssue {
    #[error("the flow has no start event")]
    MissingStart,

    #[error("the flow has {count} start events")]
    MultipleStarts { count: usize },

    #[error("the flow has no end event")]
    MissingEnd,

    #[error("connector {connector} is not attached at both ends")]
    Unattached { connector: ElementId },

    #[error("connector {connector} points at missing element {missing}")]
    Dangling {
        connector: ElementId,
        missing: ElementId,
    },

    #[error("connector {connector} leaves a {kind} element")]
    InvalidSource {
        connector: ElementId,
        kind: String,
    },

    #[error("connector {connector} enters a {kind} element")]
    InvalidTarget {
        connector: ElementId,
        kind: String,
    },

    #[error("{element} cannot be reached from the start event")]
    Unreachable { element: ElementId },

    #[error("no end event can be reached from the start event")]
    EndUnreachable,

    #[error("decision {element} has {count} outgoing connector(s), needs at least 2")]
    DecisionBranches { element: ElementId, count: usize },
}

/// Validate the chart. An empty result means the chart is well-formed.
pub fn validate(graph: &Graph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let starts: Vec<ElementId> = graph
        .nodes()
        .filter(|e| e.kind == ElementKind::Start)
        .map(|e| e.id)
        .collect();
    match starts.len() {
        0 => issues.push(ValidationIssue::MissingStart),
        1 => {}
        count => issues.push(ValidationIssue::MultipleStarts { count }),
    }
    if graph.first_of(&ElementKind::End).is_none() {
        issues.push(ValidationIssue::MissingEnd);
    }

    let mut flow: DiGraph<ElementId, ElementId> = DiGraph::new();
    let index: HashMap<ElementId, NodeIndex> = graph
        .nodes()
        .map(|e| (e.id, flow.add_node(e.id)))
        .collect();

    for connector in graph.connectors() {
        let (Some(source), Some(target)) = (connector.attribute.source, connector.attribute.target)
        else {
            issues.push(ValidationIssue::Unattached {
                connector: connector.id,
            });
            continue;
        };

        let mut attached = true;
        for end in [source, target] {
            if !index.contains_key(&end) {
                issues.push(ValidationIssue::Dangling {
                    connector: connector.id,
                    missing: end,
                });
                attached = false;
            }
        }
        if !attached {
            continue;
        }

        if let Some(kind) = graph.get(source).map(|e| &e.kind)
            && !kind.can_be_source()
        {
            issues.push(ValidationIssue::InvalidSource {
                connector: connector.id,
                kind: kind.tag().to_string(),
            });
        }
        if let Some(kind) = graph.get(target).map(|e| &e.kind)
            && !kind.can_be_target()
        {
            issues.push(ValidationIssue::InvalidTarget {
                connector: connector.id,
                kind: kind.tag().to_string(),
            });
        }

        flow.add_edge(index[&source], index[&target], connector.id);
    }

    if let [start] = starts.as_slice() {
        let mut reachable = HashSet::new();
        let mut dfs = Dfs::new(&flow, index[start]);
        while let Some(nx) = dfs.next(&flow) {
            reachable.insert(flow[nx]);
        }

        for node in graph.nodes() {
            if !reachable.contains(&node.id) {
                issues.push(ValidationIssue::Unreachable { element: node.id });
            }
        }
        let end_reached = graph
            .nodes()
            .any(|e| e.kind == ElementKind::End && reachable.contains(&e.id));
        if !end_reached && graph.first_of(&ElementKind::End).is_some() {
            issues.push(ValidationIssue::EndUnreachable);
        }
    }

    for decision in graph.nodes().filter(|e| e.kind == ElementKind::Decision) {
        let count = flow.edges(index[&decision.id]).count();
        if count < 2 {
            issues.push(ValidationIssue::DecisionBranches {
                element: decision.id,
                count,
            });
        }
    }

    issues
}
