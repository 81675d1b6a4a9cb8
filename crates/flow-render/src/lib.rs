pub mod controller;
pub mod hit;
pub mod svg;

pub use controller::{Controller, controller_for};
pub use hit::{Hit, body_at, element_at, hit_test};
pub use svg::render_svg;
