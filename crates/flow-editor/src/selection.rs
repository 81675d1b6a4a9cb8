//! The ordered set of selected elements.

use crate::input::Modifiers;
use flow_core::{ElementId, Graph};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn first(&self) -> Option<ElementId> {
        self.ids.first().copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Make `id` the only selected element.
    pub fn replace(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(pos) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Apply a click on `id`: shift/ctrl toggles nodes in and out, a
    /// plain click (or any click on a connector) replaces the selection.
    pub fn click(&mut self, graph: &Graph, id: ElementId, modifiers: Modifiers) {
        let is_connector = graph.get(id).is_some_and(|e| e.is_connector());
        if modifiers.extends_selection() && !is_connector {
            self.toggle(id);
        } else {
            self.replace(id);
        }
    }

    /// Select every drawable element.
    pub fn select_all(&mut self, graph: &Graph) {
        self.ids = graph
            .elements
            .iter()
            .filter(|e| e.kind.is_node() || e.is_connector())
            .map(|e| e.id)
            .collect();
    }

    /// Drop ids that no longer exist in `graph`.
    pub fn retain_existing(&mut self, graph: &Graph) {
        self.ids.retain(|id| graph.contains(*id));
    }
}
