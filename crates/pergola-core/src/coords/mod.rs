//! Coordinate and geometry types shared across the renderer seam and UI.
//!
//! Canonical CPU space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Angles are degrees, positive clockwise in this space. Rotation pivots
//! are explicit; widgets rotate about their rect origin.

mod color;
mod curve;
mod rect;
mod vec2;

pub use color::ColorRgba;
pub use curve::{point_along_bezier, point_along_line};
pub use rect::Rect;
pub use vec2::Vec2;
