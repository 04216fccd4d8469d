//! Text shaping and rasterization.
//!
//! Widgets measure and rasterize text through [`TextShaper`]; the stock
//! implementation is the fontdue-backed [`FontSystem`]. Test code
//! substitutes a deterministic shaper instead of loading real fonts.

mod font_system;

use crate::coords::{ColorRgba, Vec2};
use crate::render::TextImage;

pub use font_system::{FontId, FontLoadError, FontSystem};

/// Shaping capability consumed by the widget layer.
pub trait TextShaper {
    /// Pixel extent of `text` laid out at size `px`.
    ///
    /// Empty text reports zero width but a representative line height, so
    /// carets and prompts keep their vertical size.
    fn measure(&self, text: &str, font: FontId, px: f32) -> Vec2;

    /// Rasterizes `text` at size `px` into an RGBA image tinted `color`.
    ///
    /// Returns `None` when nothing would be drawn (empty or zero-extent
    /// text, unknown font).
    fn rasterize(&self, text: &str, font: FontId, px: f32, color: ColorRgba)
    -> Option<TextImage>;
}
