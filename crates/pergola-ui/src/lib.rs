//! Pergola UI: retained widget set on top of `pergola-core`.
//!
//! Widgets are long-lived objects shared by handle (`Arc<dyn Element>`)
//! and grouped into nestable [`Set`](set::Set) containers. Each frame the
//! application hands the root set the frame's input batch and a
//! [`Painter`](painter::Painter); the set translates coordinates, tracks
//! which elements sit under the pointer, and dispatches bound callbacks.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use pergola_ui::prelude::*;
//!
//! let root = Set::new();
//! root.set_rect(Rect::new(0.0, 0.0, 800.0, 600.0));
//!
//! let button = Arc::new(Button::new(icon_texture));
//! button.set_rect(Rect::new(10.0, 10.0, 80.0, 24.0));
//! button.bind(
//!     EventKind::LeftUp,
//!     Arc::new(|_element, _event| println!("clicked!")),
//! );
//! root.attach(button);
//!
//! // Each frame, with your renderer and font system:
//! let mut painter = Painter::new(&mut gfx, &fonts);
//! root.process_input(&events, &mut painter);
//! root.render(&mut painter);
//! ```
//!
//! # Extending with custom widgets
//!
//! Embed an [`ElementBase`](element::ElementBase) and implement
//! [`Element`](element::Element); override only the hooks you need and the
//! base carries geometry, focus, and callback dispatch:
//!
//! ```rust,ignore
//! use pergola_ui::prelude::*;
//!
//! pub struct Gauge {
//!     base: ElementBase,
//!     level: f32,
//! }
//!
//! impl Element for Gauge {
//!     fn base(&self) -> &ElementBase {
//!         &self.base
//!     }
//!     fn as_element(&self) -> &dyn Element {
//!         self
//!     }
//!     fn render(&self, painter: &mut Painter<'_>) {
//!         let mut bar = self.rect();
//!         bar.size.x *= self.level;
//!         painter.gfx.fill_rect(bar, ColorRgba::white());
//!     }
//! }
//! ```

pub mod clipboard;
pub mod element;
pub mod painter;
pub mod set;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_support;

/// Everything needed to build and extend a widget tree.
pub mod prelude {
    pub use crate::clipboard::{Clipboard, SystemClipboard};
    pub use crate::element::{Element, ElementBase, ElementRef, EventCallback, EventKind};
    pub use crate::painter::Painter;
    pub use crate::set::Set;
    pub use crate::widgets::{
        button::Button,
        item::Item,
        item_holder::{AcceptFn, ItemHolder},
        scroll_bar::{ScrollBar, ScrollPart},
        scroll_window::ScrollWindow,
        text_field::{FieldColor, TextField},
    };

    // Re-export the core primitives everyone needs.
    pub use pergola_core::coords::{ColorRgba, Rect, Vec2};
    pub use pergola_core::input::{InputEvent, Key, Modifiers, MouseButton};
    pub use pergola_core::render::{Flip, Renderer, TextureId};
    pub use pergola_core::text::{FontId, FontSystem, TextShaper};
}
