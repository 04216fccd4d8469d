//! Renderer seam.
//!
//! Widgets never talk to a concrete graphics API; they draw through
//! [`Renderer`], which a backend (GPU, software, test double) implements.
//! The surface is deliberately small: solid fills, lines, textured quads
//! with rotation/flip, and offscreen render targets for widgets that cache
//! their composition.

use crate::coords::{ColorRgba, Rect, Vec2, point_along_bezier};

/// Opaque handle to a backend texture.
///
/// Handles are minted by the backend (targets, uploads) or by application
/// asset loading; widget code only stores and passes them back.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub u64);

/// Mirroring applied when drawing a texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Flip {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

/// CPU-side RGBA8 image produced by text rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct TextImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA rows, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// Drawing capability consumed by the widget layer.
///
/// Rotation follows the canonical screen space: degrees, clockwise, pivot
/// at the destination rect's top-left corner.
///
/// Resource creation reports failure as `None`; callers skip the affected
/// draw rather than retrying.
pub trait Renderer {
    /// Creates a blank render target of the given pixel size.
    ///
    /// Targets composite with alpha blending when drawn.
    fn create_target(&mut self, width: u32, height: u32) -> Option<TextureId>;

    /// Releases a texture previously minted by this renderer.
    fn destroy_texture(&mut self, texture: TextureId);

    /// Redirects subsequent drawing into `target` until the matching
    /// [`pop_target`](Renderer::pop_target).
    fn push_target(&mut self, target: TextureId);

    /// Restores the previous render target.
    fn pop_target(&mut self);

    /// Fills the current target with `color`.
    fn clear(&mut self, color: ColorRgba);

    fn fill_rect(&mut self, rect: Rect, color: ColorRgba);

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: ColorRgba);

    /// Draws `src` (whole texture when `None`) into `dst`, rotated by
    /// `angle` degrees about `dst.origin`, mirrored per `flip`.
    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle: f32,
        flip: Flip,
    );

    /// Uploads a rasterized text image as a texture.
    fn upload_text(&mut self, image: &TextImage) -> Option<TextureId>;
}

/// Draws a cubic Bezier curve as a polyline of `segments` chords.
///
/// `segments_to_draw` limits how many chords are drawn from the start of
/// the curve; `0` draws all of them. Returns `false` without drawing when
/// `segments < 3`, too coarse to look like a curve.
pub fn draw_bezier(
    gfx: &mut dyn Renderer,
    p0: Vec2,
    c0: Vec2,
    c1: Vec2,
    p1: Vec2,
    color: ColorRgba,
    segments: u32,
    segments_to_draw: u32,
) -> bool {
    if segments < 3 {
        return false;
    }

    let count = if segments_to_draw == 0 {
        segments
    } else {
        segments_to_draw.min(segments)
    };

    let mut previous = p0;
    for i in 1..=count {
        let next = point_along_bezier(p0, c0, c1, p1, i as f32 / segments as f32);
        gfx.draw_line(previous, next, color);
        previous = next;
    }

    true
}
