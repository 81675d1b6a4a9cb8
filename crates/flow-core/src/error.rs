//! Error types for flowchart mutations and persistence.
//!
//! Every mutation reports failure through [`FlowError`]. The editor layer
//! turns these into logged no-ops so a bad gesture or a stale host option
//! never takes the canvas down.

use crate::id::ElementId;
use crate::model::ElementKind;
use thiserror::Error;

/// Why a mutation or a parse was refused.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("malformed graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("element id {0} is already in use")]
    DuplicateId(ElementId),

    #[error("connector cannot start and end on {0}")]
    SelfLoop(ElementId),

    // Not named `source`: thiserror would treat that field as the cause.
    #[error("{from} is already connected to {to}")]
    DuplicateConnector { from: ElementId, to: ElementId },

    #[error("a {kind} element cannot be the {role} of a connector")]
    NotConnectable { kind: ElementKind, role: EndpointRole },

    #[error("connector released over empty canvas")]
    NoTarget,

    #[error("start and end events cannot be deleted")]
    ProtectedEvent(ElementId),

    #[error("the graph is read-only")]
    ReadOnly,

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Which end of a connector an element was offered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Source,
    Target,
}

impl std::fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRole::Source => f.write_str("source"),
            EndpointRole::Target => f.write_str("target"),
        }
    }
}

impl FlowError {
    /// Shorthand for [`FlowError::InvalidValue`].
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FlowError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
