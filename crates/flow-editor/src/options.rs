//! Host mutation options: the payloads accepted by
//! [`FlowContainer::handle`](crate::container::FlowContainer::handle).
//!
//! A JSON array is a list of element options, applied together as one
//! undo step:
//!
//! ```json
//! [{"type": "update", "data": {"id": 3, "field": "text", "value": "Review"}},
//!  {"type": "delete", "data": {"id": "c2"}}]
//! ```
//!
//! A JSON object is a single graph option:
//!
//! ```json
//! {"type": "update", "data": {"field": "scale", "value": 1.5}}
//! ```
//!
//! An element option without an `id` applies to the current selection.

use flow_core::{Element, ElementId, FlowError, ValidationIssue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementAction {
    /// `value` is an element object (`{type, attribute?, status?}`).
    Create,
    /// Set `field` to `value`.
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphAction {
    /// Return the structural validation issues.
    Validate,
    /// Return the graph as JSON.
    Data,
    /// Set `field` (`x`, `y`, `scale`, `height`, `readOnly`) to `value`.
    Update,
}

/// The `data` payload shared by every option.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionData {
    #[serde(default)]
    pub id: Option<ElementId>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl OptionData {
    pub fn field(&self) -> Result<&str, FlowError> {
        self.field
            .as_deref()
            .ok_or_else(|| FlowError::invalid("field", "missing"))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementOption {
    #[serde(rename = "type")]
    pub action: ElementAction,
    #[serde(default)]
    pub data: OptionData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphOption {
    #[serde(rename = "type")]
    pub action: GraphAction,
    #[serde(default)]
    pub data: OptionData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HandleOption {
    Elements(Vec<ElementOption>),
    Graph(GraphOption),
}

impl HandleOption {
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// What [`FlowContainer::handle`](crate::container::FlowContainer::handle)
/// returns to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum HandleOutput {
    /// Result of element options.
    Elements {
        created: Vec<ElementId>,
        deleted: Vec<Element>,
    },
    Issues(Vec<ValidationIssue>),
    /// The graph document, as produced by `to_json`.
    Data(String),
    /// A graph field was updated.
    Updated,
}
