//! Viewport operations: wheel zoom and panning.

use crate::config::ZoomConfig;
use crate::model::Graph;
use kurbo::{Point, Vec2};

/// Wheel delta units that make up one zoom notch.
const NOTCH: f64 = 100.0;

/// A wheel event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wheel {
    pub x: f64,
    pub y: f64,
    /// Positive scrolls down (zoom out), negative scrolls up (zoom in).
    pub delta_y: f64,
}

/// Zoom around the cursor.
///
/// The scale changes by `step^(-delta_y / 100)` and is clamped to the
/// configured bounds. The pan offset is recomputed so the canvas point under
/// the cursor stays under the cursor. Returns `true` if the viewport changed.
pub fn zoom(graph: &mut Graph, wheel: Wheel, config: &ZoomConfig) -> bool {
    if !wheel.delta_y.is_finite() || wheel.delta_y == 0.0 {
        return false;
    }
    let factor = config.step.powf(-wheel.delta_y / NOTCH);
    let old_scale = graph.scale;
    let new_scale = config.clamp(old_scale * factor);
    if !new_scale.is_finite() || (new_scale - old_scale).abs() < f64::EPSILON {
        return false;
    }
    zoom_to(graph, new_scale, Point::new(wheel.x, wheel.y));
    true
}

/// Set the scale to `scale`, keeping the canvas point under `anchor`
/// (screen coordinates) fixed.
pub fn zoom_to(graph: &mut Graph, scale: f64, anchor: Point) {
    let canvas = graph.to_canvas(anchor);
    graph.scale = scale;
    graph.x = anchor.x - canvas.x * scale;
    graph.y = anchor.y - canvas.y * scale;
    log::trace!("zoom to {scale:.3} at ({:.1}, {:.1})", anchor.x, anchor.y);
}

/// Shift the pan offset by a screen-space delta.
pub fn pan(graph: &mut Graph, delta: Vec2) {
    graph.x += delta.x;
    graph.y += delta.y;
}
