pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod json;
pub mod model;
pub mod validate;
pub mod view;

pub use config::{FlowConfig, ZoomConfig};
pub use error::{EndpointRole, FlowError};
pub use id::ElementId;
pub use json::{parse_graph, to_json, try_parse_graph};
pub use model::*;
pub use validate::{ValidationIssue, validate};
pub use view::{Wheel, pan, zoom};

// Re-export kurbo types so downstream crates share one geometry vocabulary
pub use kurbo::{Point, Size, Vec2};
