pub mod commands;
pub mod container;
pub mod element;
pub mod engine;
pub mod gesture;
pub mod input;
pub mod line;
pub mod options;
pub mod selection;
pub mod shortcuts;

pub use container::{FlowContainer, FlowListener, NoopListener};
pub use engine::{Applied, Engine, GraphMutation};
pub use input::{InputEvent, Modifiers};
pub use options::{HandleOption, HandleOutput};
pub use selection::Selection;
