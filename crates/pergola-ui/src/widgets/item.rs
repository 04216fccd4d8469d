//! Draggable value-carrying widget.
//!
//! An item follows the pointer while the left button is held and docks
//! into an [`ItemHolder`] of the same value type when dropped on one. The
//! drop test reads the owning container's focus pair: the item has to be
//! the top focus with a holder directly underneath.

use std::any::Any;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use pergola_core::coords::{Rect, Vec2};
use pergola_core::input::{InputEvent, MouseButton, MouseButtonState};
use pergola_core::render::TextureId;

use crate::element::{Element, ElementBase, EventKind};
use crate::painter::Painter;
use crate::widgets::item_holder::ItemHolder;

struct Skin {
    texture: TextureId,
    src: Option<Rect>,
}

struct ItemState<T: Send + Sync + 'static> {
    moving: bool,
    holder: Option<Weak<ItemHolder<T>>>,
}

pub struct Item<T: Send + Sync + 'static> {
    base: ElementBase,
    skin: Mutex<Skin>,
    state: Mutex<ItemState<T>>,
    value: T,
    weak: Weak<Item<T>>,
}

impl<T: Send + Sync + 'static> Item<T> {
    pub fn new(texture: TextureId, value: T) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            base: ElementBase::new(),
            skin: Mutex::new(Skin { texture, src: None }),
            state: Mutex::new(ItemState {
                moving: false,
                holder: None,
            }),
            value,
            weak: weak.clone(),
        })
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn texture(&self) -> TextureId {
        self.skin.lock().texture
    }

    pub fn set_texture(&self, texture: TextureId) {
        self.skin.lock().texture = texture;
    }

    pub fn src_rect(&self) -> Option<Rect> {
        self.skin.lock().src
    }

    pub fn set_src_rect(&self, src: Option<Rect>) {
        self.skin.lock().src = src;
    }

    /// Whether a drag is in progress.
    pub fn is_moving(&self) -> bool {
        self.state.lock().moving
    }

    /// The holder this item is docked into, if any.
    pub fn holder(&self) -> Option<Arc<ItemHolder<T>>> {
        self.state.lock().holder.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_holder(&self, holder: Option<Weak<ItemHolder<T>>>) {
        self.state.lock().holder = holder;
    }

    /// Starts a drag. A docked item undocks first; undocking fires
    /// [`EventKind::ValueChanged`] on the item as well as on the holder.
    pub fn pickup(&self) {
        let docked = {
            let mut state = self.state.lock();
            state.moving = true;
            state.holder.take().and_then(|weak| weak.upgrade())
        };
        if let Some(holder) = docked {
            holder.set_child(None);
            self.base
                .invoke(self.as_element(), EventKind::ValueChanged, None);
        }
    }

    /// Ends a drag. When the owning container's focus pair shows this item
    /// on top of a type-compatible holder, the item docks into it.
    pub fn release(&self) {
        self.state.lock().moving = false;
        let Some(parent) = self.base.parent() else { return };
        let [Some(top), Some(below)] = parent.focused_elements() else {
            return;
        };
        if !std::ptr::addr_eq(Arc::as_ptr(&top), self as *const Self) {
            return;
        }
        let below: Arc<dyn Any + Send + Sync> = below;
        let Ok(holder) = below.downcast::<ItemHolder<T>>() else {
            return;
        };
        if let Some(me) = self.weak.upgrade() {
            holder.set_child(Some(&me));
        }
    }
}

impl<T: Send + Sync + 'static> Element for Item<T> {
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

    fn process_input(&self, events: &[InputEvent], _painter: &mut Painter<'_>) {
        self.base.dispatch_batch(self.as_element(), events);
        for event in events {
            if !self.has_focus() {
                continue;
            }
            match event {
                InputEvent::PointerMoved(m) => {
                    if self.is_moving() {
                        let rect = self.rect();
                        self.set_rect(Rect::from_origin_size(
                            rect.origin + Vec2::new(m.dx, m.dy),
                            rect.size,
                        ));
                    }
                }
                InputEvent::PointerButton(b)
                    if b.button == MouseButton::Left
                        && b.state == MouseButtonState::Pressed =>
                {
                    self.pickup();
                }
                InputEvent::PointerButton(b)
                    if b.button == MouseButton::Left
                        && b.state == MouseButtonState::Released =>
                {
                    self.release();
                }
                _ => {}
            }
        }
    }

    fn reset_input(&self) {
        self.release();
    }

    fn focus_changed(&self, has_focus: bool) {
        if !has_focus && self.is_moving() {
            self.release();
        }
    }
}
