//! Textured push button.
//!
//! A button has no behavior of its own beyond the base element contract:
//! it draws a texture over its rect and dispatches input to whatever
//! callbacks are bound. A click handler is a [`EventKind::LeftUp`] binding.

use parking_lot::Mutex;

use pergola_core::coords::Rect;
use pergola_core::render::TextureId;

use crate::element::{Element, ElementBase};
use crate::painter::Painter;

struct Skin {
    texture: TextureId,
    src: Option<Rect>,
}

pub struct Button {
    base: ElementBase,
    skin: Mutex<Skin>,
}

impl Button {
    pub fn new(texture: TextureId) -> Self {
        Self {
            base: ElementBase::new(),
            skin: Mutex::new(Skin { texture, src: None }),
        }
    }

    pub fn texture(&self) -> TextureId {
        self.skin.lock().texture
    }

    pub fn set_texture(&self, texture: TextureId) {
        self.skin.lock().texture = texture;
    }

    /// Sub-rect of the texture to draw, `None` for the whole texture.
    pub fn src_rect(&self) -> Option<Rect> {
        self.skin.lock().src
    }

    pub fn set_src_rect(&self, src: Option<Rect>) {
        self.skin.lock().src = src;
    }
}

impl Element for Button {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    fn render(&self, painter: &mut Painter<'_>) {
        let (texture, src) = {
            let skin = self.skin.lock();
            (skin.texture, skin.src)
        };
        painter
            .gfx
            .draw_texture(texture, src, self.rect(), self.angle(), self.flip());
    }
}
