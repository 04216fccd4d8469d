//! Per-frame drawing context handed to elements.

use pergola_core::render::Renderer;
use pergola_core::text::TextShaper;

/// Bundles the renderer and text shaper an element tree draws with.
///
/// Built fresh each frame by the application and threaded through
/// [`Element::render`](crate::element::Element::render) and
/// [`Element::process_input`](crate::element::Element::process_input);
/// widgets that cache textures use it to (re)build them.
pub struct Painter<'a> {
    pub gfx: &'a mut dyn Renderer,
    pub fonts: &'a dyn TextShaper,
}

impl<'a> Painter<'a> {
    pub fn new(gfx: &'a mut dyn Renderer, fonts: &'a dyn TextShaper) -> Self {
        Self { gfx, fonts }
    }
}
