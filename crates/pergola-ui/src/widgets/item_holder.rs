//! Docking slot for draggable [`Item`]s.
//!
//! A holder carries at most one item of a matching value type. Docking and
//! undocking go through [`ItemHolder::set_child`], which drag gestures on
//! the item call on their own; an optional accept predicate lets the
//! application veto either direction.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use pergola_core::coords::Rect;
use pergola_core::render::TextureId;

use crate::element::{Element, ElementBase, EventKind};
use crate::painter::Painter;
use crate::widgets::item::Item;

/// Veto hook consulted before a dock or undock goes through. The candidate
/// is `Some` for docking and `None` for undocking.
pub type AcceptFn<T> =
    Arc<dyn Fn(&ItemHolder<T>, Option<&Item<T>>) -> bool + Send + Sync>;

struct Skin {
    texture: TextureId,
    src: Option<Rect>,
}

struct HolderState<T: Send + Sync + 'static> {
    child: Option<Arc<Item<T>>>,
    accept: Option<AcceptFn<T>>,
}

pub struct ItemHolder<T: Send + Sync + 'static> {
    base: ElementBase,
    skin: Mutex<Skin>,
    state: Mutex<HolderState<T>>,
    weak: Weak<ItemHolder<T>>,
}

impl<T: Send + Sync + 'static> ItemHolder<T> {
    pub fn new(texture: TextureId) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            base: ElementBase::new(),
            skin: Mutex::new(Skin { texture, src: None }),
            state: Mutex::new(HolderState {
                child: None,
                accept: None,
            }),
            weak: weak.clone(),
        })
    }

    pub fn with_accept(texture: TextureId, accept: AcceptFn<T>) -> Arc<Self> {
        let holder = Self::new(texture);
        holder.set_accept(Some(accept));
        holder
    }

    pub fn set_accept(&self, accept: Option<AcceptFn<T>>) {
        self.state.lock().accept = accept;
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

    /// The docked item, if any.
    pub fn child(&self) -> Option<Arc<Item<T>>> {
        self.state.lock().child.clone()
    }

    /// Docks `Some(item)` or undocks with `None`. Returns whether the
    /// operation went through: it needs the accept predicate's blessing
    /// (when one is set) and a genuine transition, so docking into an
    /// occupied holder and undocking from an empty one both report `false`.
    ///
    /// A successful dock centers the item on the holder and aligns its
    /// angle; both directions fire [`EventKind::ValueChanged`] on the
    /// holder.
    pub fn set_child(&self, candidate: Option<&Arc<Item<T>>>) -> bool {
        let (accept, occupied) = {
            let state = self.state.lock();
            (state.accept.clone(), state.child.is_some())
        };
        if candidate.is_some() == occupied {
            return false;
        }
        if let Some(accept) = accept {
            if !accept(self, candidate.map(Arc::as_ref)) {
                return false;
            }
        }
        match candidate {
            Some(item) => {
                {
                    let mut state = self.state.lock();
                    if state.child.is_some() {
                        return false;
                    }
                    state.child = Some(item.clone());
                }
                item.set_holder(Some(self.weak.clone()));
                self.center_child();
            }
            None => {
                let old = { self.state.lock().child.take() };
                let Some(old) = old else { return false };
                old.set_holder(None);
            }
        }
        self.base
            .invoke(self.as_element(), EventKind::ValueChanged, None);
        true
    }

    /// Moves the docked item onto the holder's center, in the holder's
    /// rotated frame, and matches its angle.
    fn center_child(&self) {
        let Some(child) = self.child() else { return };
        let rect = self.rect();
        let angle = self.angle();
        let child_size = child.rect().size;
        let nominal = rect.center() - child_size / 2.0;
        let origin = nominal.rotated_about(angle, rect.origin);
        child.set_rect(Rect::from_origin_size(origin, child_size));
        child.set_angle(angle);
    }
}

impl<T: Send + Sync + 'static> Element for ItemHolder<T> {
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

    fn set_rect(&self, rect: Rect) {
        self.base.store_rect(rect);
        self.center_child();
    }

    fn set_angle(&self, degrees: f32) {
        self.base.store_angle(degrees);
        self.center_child();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pergola_core::coords::{Rect, Vec2};
    use pergola_core::render::TextureId;

    use super::*;
    use crate::test_support::CallLog;

    fn holder_at(x: f32, y: f32, w: f32, h: f32) -> Arc<ItemHolder<u32>> {
        let holder = ItemHolder::new(TextureId(1));
        holder.set_rect(Rect::new(x, y, w, h));
        holder
    }

    fn item_of(value: u32) -> Arc<Item<u32>> {
        let item = Item::new(TextureId(2), value);
        item.set_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        item
    }

    // ── docking transitions ──────────────────────────────────────────────

    #[test]
    fn docks_into_an_empty_holder_and_centers() {
        let holder = holder_at(10.0, 10.0, 40.0, 40.0);
        let item = item_of(5);

        assert!(holder.set_child(Some(&item)));
        assert_eq!(item.rect().origin, Vec2::new(25.0, 25.0));
        assert!(holder.child().is_some());
        assert!(item.holder().is_some());
    }

    #[test]
    fn occupied_holder_rejects_a_second_item() {
        let holder = holder_at(0.0, 0.0, 40.0, 40.0);
        let first = item_of(1);
        let second = item_of(2);

        assert!(holder.set_child(Some(&first)));
        assert!(!holder.set_child(Some(&second)));
        assert_eq!(*holder.child().unwrap().value(), 1);
        assert!(second.holder().is_none());
    }

    #[test]
    fn undock_clears_both_references() {
        let holder = holder_at(0.0, 0.0, 40.0, 40.0);
        let item = item_of(3);
        holder.set_child(Some(&item));

        assert!(holder.set_child(None));
        assert!(holder.child().is_none());
        assert!(item.holder().is_none());
        assert!(!holder.set_child(None));
    }

    #[test]
    fn each_transition_fires_value_changed_once() {
        let holder = holder_at(0.0, 0.0, 40.0, 40.0);
        let item = item_of(4);
        let log = CallLog::default();
        holder.bind(EventKind::ValueChanged, log.callback("changed"));

        holder.set_child(Some(&item));
        holder.set_child(None);
        holder.set_child(None);

        assert_eq!(log.count("changed"), 2);
    }

    // ── accept predicate ─────────────────────────────────────────────────

    #[test]
    fn accept_gates_docking_and_undocking() {
        let even_only: AcceptFn<u32> = Arc::new(|_, candidate| match candidate {
            Some(item) => item.value() % 2 == 0,
            None => false,
        });
        let holder = ItemHolder::with_accept(TextureId(1), even_only);
        holder.set_rect(Rect::new(0.0, 0.0, 40.0, 40.0));

        let odd = item_of(3);
        let even = item_of(4);

        assert!(!holder.set_child(Some(&odd)));
        assert!(holder.set_child(Some(&even)));
        assert!(!holder.set_child(None));
        assert!(holder.child().is_some());
    }

    // ── geometry ─────────────────────────────────────────────────────────

    #[test]
    fn moving_the_holder_recenters_the_item() {
        let holder = holder_at(0.0, 0.0, 40.0, 40.0);
        let item = item_of(6);
        holder.set_child(Some(&item));
        assert_eq!(item.rect().origin, Vec2::new(15.0, 15.0));

        holder.set_rect(Rect::new(100.0, 0.0, 40.0, 40.0));
        assert_eq!(item.rect().origin, Vec2::new(115.0, 15.0));
    }

    #[test]
    fn rotating_the_holder_carries_the_item_along() {
        let holder = holder_at(0.0, 0.0, 40.0, 40.0);
        let item = item_of(7);
        holder.set_child(Some(&item));

        holder.set_angle(90.0);

        // Center (15,15) relative to the pivot maps to (-15,15) under a
        // quarter turn.
        let origin = item.rect().origin;
        assert!((origin.x + 15.0).abs() < 1e-4);
        assert!((origin.y - 15.0).abs() < 1e-4);
        assert_eq!(item.angle(), 90.0);
    }
}
