//! Pergola core crate.
//!
//! Platform-agnostic services consumed by the widget layer: geometry,
//! input events, the renderer and text-shaping seams, logging.

pub mod coords;
pub mod input;
pub mod logging;
pub mod render;
pub mod text;
