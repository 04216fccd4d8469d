//! Container element.
//!
//! A [`Set`] owns an ordered stack of children (later means topmost),
//! renders them as a unit (through a backing target when the set has a
//! positive-size rect), and routes input:
//! coordinate-bearing events are translated into the set's local frame
//! before children see them, and the two topmost children under the
//! pointer are tracked as the focus slots. Slot 0 is told about focus
//! gain/loss; slot 1 rides along silently so a drag released over a pair
//! of stacked elements can find both.
//!
//! Sets nest. A child set only processes input while it has focus itself,
//! so focus gates whole subtrees.

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use pergola_core::coords::{ColorRgba, Rect, Vec2};
use pergola_core::input::{InputEvent, PointerButtonEvent, PointerMoveEvent};
use pergola_core::render::TextureId;

use crate::element::{Element, ElementBase, ElementRef};
use crate::painter::Painter;

struct SetCore {
    children: Vec<ElementRef>,
    /// Slot 0 is the topmost child under the pointer, slot 1 the next one
    /// down. Recomputed when `focus_dirty` is set or the pointer moves.
    focused: [Option<ElementRef>; 2],
    focus_dirty: bool,
    /// Last pointer position seen by this set, in local coordinates.
    /// Focus recomputes triggered by geometry changes reuse it when the
    /// triggering frame carries no motion event.
    last_pointer: Option<Vec2>,
}

struct BackingState {
    texture: Option<TextureId>,
    /// Set when the backing target's size went stale; consumed on the
    /// next render, which is the first point with renderer access.
    recreate: bool,
    background: ColorRgba,
    /// Offset added to every child rect at render time and subtracted
    /// from incoming pointer coordinates. Scrolling a subtree is moving
    /// this corner.
    render_corner: Vec2,
}

/// Container for elements; itself an element, so sets nest.
pub struct Set {
    base: ElementBase,
    core: ReentrantMutex<RefCell<SetCore>>,
    backing: Mutex<BackingState>,
}

impl Set {
    /// Creates an empty set. A set starts focused so a root set processes
    /// input without further ceremony; attaching it to a parent drops the
    /// flag like any other attach.
    pub fn new() -> Arc<Self> {
        let set = Arc::new(Self {
            base: ElementBase::new(),
            core: ReentrantMutex::new(RefCell::new(SetCore {
                children: Vec::new(),
                focused: [None, None],
                focus_dirty: false,
                last_pointer: None,
            })),
            backing: Mutex::new(BackingState {
                texture: None,
                recreate: false,
                background: ColorRgba::new(1.0, 1.0, 1.0, 0.0),
                render_corner: Vec2::ZERO,
            }),
        });
        set.base.set_focus_raw(true);
        set
    }

    /// Creates a set holding `children`, attached in order (first is
    /// bottommost).
    pub fn with_children(children: impl IntoIterator<Item = ElementRef>) -> Arc<Self> {
        let set = Self::new();
        set.attach_many(children);
        set
    }

    /// Adds `element` on top of the stack.
    ///
    /// Rejects the set itself and duplicates. The element is unlinked
    /// from any previous owner, arrives unfocused, and a focus recompute
    /// is scheduled.
    pub fn attach(self: &Arc<Self>, element: ElementRef) -> bool {
        if std::ptr::addr_eq(Arc::as_ptr(self), Arc::as_ptr(&element)) {
            log::warn!("set cannot contain itself");
            return false;
        }
        {
            let guard = self.core.lock();
            let core = guard.borrow();
            if core.children.iter().any(|c| Arc::ptr_eq(c, &element)) {
                return false;
            }
        }
        if let Some(previous_owner) = element.base().take_parent() {
            previous_owner.remove(&element);
        }
        {
            let guard = self.core.lock();
            let mut core = guard.borrow_mut();
            core.children.push(element.clone());
            core.focus_dirty = true;
        }
        element.base().set_parent(Some(Arc::downgrade(self)));
        element.set_focus(false);
        true
    }

    /// Adds every element in `elements`; returns how many were accepted.
    pub fn attach_many(self: &Arc<Self>, elements: impl IntoIterator<Item = ElementRef>) -> usize {
        elements
            .into_iter()
            .filter(|element| self.attach(element.clone()))
            .count()
    }

    /// Removes `element`; returns whether it was a child. The focus slots
    /// are purged so nothing routes to a detached element.
    pub fn remove(&self, element: &ElementRef) -> bool {
        let found = {
            let guard = self.core.lock();
            let mut core = guard.borrow_mut();
            let Some(index) = core
                .children
                .iter()
                .position(|c| Arc::ptr_eq(c, element))
            else {
                return false;
            };
            core.children.remove(index);
            for slot in core.focused.iter_mut() {
                if slot.as_ref().is_some_and(|f| Arc::ptr_eq(f, element)) {
                    *slot = None;
                }
            }
            core.focus_dirty = true;
            true
        };
        if found {
            element.base().set_parent(None);
        }
        found
    }

    /// Removes and returns the child at `index` (0 is bottommost).
    pub fn remove_at(&self, index: usize) -> Option<ElementRef> {
        let element = {
            let guard = self.core.lock();
            let core = guard.borrow();
            core.children.get(index).cloned()
        }?;
        self.remove(&element);
        Some(element)
    }

    /// Snapshot of the child stack, bottommost first.
    pub fn children(&self) -> Vec<ElementRef> {
        let guard = self.core.lock();
        let children = guard.borrow().children.clone();
        children
    }

    /// The current focus slots: `[topmost under pointer, next one down]`.
    pub fn focused_elements(&self) -> [Option<ElementRef>; 2] {
        let guard = self.core.lock();
        let focused = guard.borrow().focused.clone();
        focused
    }

    /// Schedules a focus-slot recompute for the next input pass.
    pub fn mark_focus_dirty(&self) {
        let guard = self.core.lock();
        guard.borrow_mut().focus_dirty = true;
    }

    pub fn background(&self) -> ColorRgba {
        self.backing.lock().background
    }

    /// Color the backing target is cleared to each frame. Defaults to
    /// transparent white.
    pub fn set_background(&self, color: ColorRgba) {
        self.backing.lock().background = color;
    }

    pub fn render_corner(&self) -> Vec2 {
        self.backing.lock().render_corner
    }

    /// Moves the children's shared render offset and schedules a focus
    /// recompute, since everything under the pointer may have shifted.
    pub fn set_render_corner(&self, corner: Vec2) {
        self.backing.lock().render_corner = corner;
        self.mark_focus_dirty();
    }

    /// Maps a window-frame point into this set's local frame, walking
    /// down from the outermost ancestor.
    pub fn window_to_local(&self, window_point: Vec2) -> Vec2 {
        let point = match self.base.parent() {
            Some(parent) => parent.window_to_local(window_point),
            None => window_point,
        };
        let rect = self.rect();
        let corner = self.render_corner();
        let rotated = point.rotated_about(-self.angle(), rect.origin);
        rotated - rect.origin - corner
    }

    /// Maps a local-frame point out to the window frame, walking up
    /// through every ancestor's offset and rotation.
    pub fn local_to_window(&self, local_point: Vec2) -> Vec2 {
        let rect = self.rect();
        let corner = self.render_corner();
        let shifted = local_point + rect.origin + corner;
        let rotated = shifted.rotated_about(self.angle(), rect.origin);
        match self.base.parent() {
            Some(parent) => parent.local_to_window(rotated),
            None => rotated,
        }
    }

    /// [`window_to_local`](Set::window_to_local) snapped to whole pixels,
    /// matching the rounding hit-tests use.
    pub fn window_to_local_rounded(&self, window_point: Vec2) -> Vec2 {
        self.window_to_local(window_point).rounded()
    }

    /// [`local_to_window`](Set::local_to_window) snapped to whole pixels.
    pub fn local_to_window_rounded(&self, local_point: Vec2) -> Vec2 {
        self.local_to_window(local_point).rounded()
    }
}

impl Element for Set {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    /// Draws the children offset by the render corner. With a
    /// positive-size rect they go through the backing target, which is
    /// then composited into the parent frame with the set's angle and
    /// flip; otherwise they draw straight into the surrounding target, the
    /// way a root set covers the window. A fully collapsed rect (both
    /// dimensions zero or less) also releases the cached target.
    fn render(&self, painter: &mut Painter<'_>) {
        let rect = self.rect();
        let positive = rect.size.x > 0.0 && rect.size.y > 0.0;

        let (texture, background, corner) = {
            let mut backing = self.backing.lock();
            if !positive {
                if rect.size.x <= 0.0 && rect.size.y <= 0.0 {
                    if let Some(texture) = backing.texture.take() {
                        painter.gfx.destroy_texture(texture);
                    }
                }
                (None, backing.background, backing.render_corner)
            } else {
                if backing.recreate {
                    if let Some(texture) = backing.texture.take() {
                        painter.gfx.destroy_texture(texture);
                    }
                    backing.recreate = false;
                }
                if backing.texture.is_none() {
                    let width = rect.size.x.round() as u32;
                    let height = rect.size.y.round() as u32;
                    backing.texture = painter.gfx.create_target(width, height);
                    if backing.texture.is_some() {
                        log::debug!("set backing target created ({width}x{height})");
                    }
                }
                if backing.texture.is_none() {
                    log::warn!("set backing target unavailable, skipping frame");
                    return;
                }
                (backing.texture, backing.background, backing.render_corner)
            }
        };

        if let Some(texture) = texture {
            painter.gfx.push_target(texture);
            painter.gfx.clear(background);
        }

        for child in self.children() {
            let saved = child.rect();
            let mut shifted = saved;
            shifted.origin = shifted.origin + corner;
            child.set_rect(shifted);
            child.render(painter);
            child.set_rect(saved);
        }

        if let Some(texture) = texture {
            painter.gfx.pop_target();
            painter
                .gfx
                .draw_texture(texture, None, rect, self.angle(), self.flip());
        }
    }

    /// Translates coordinate-bearing events into the local frame, hands
    /// the batch to every child topmost-first, and recomputes the focus
    /// slots when the pointer moved or a recompute is pending.
    fn process_input(&self, events: &[InputEvent], painter: &mut Painter<'_>) {
        if !self.has_focus() {
            return;
        }

        let rect = self.rect();
        let angle = self.angle();
        let corner = self.render_corner();
        let to_local = |p: Vec2| p.rotated_about(-angle, rect.origin) - rect.origin - corner;

        let (children, pending) = {
            let guard = self.core.lock();
            let mut core = guard.borrow_mut();
            let snapshot = core.children.clone();
            let pending = core.focus_dirty;
            core.focus_dirty = false;
            (snapshot, pending)
        };

        let mut update_focus = pending;
        let mut seen_pointer = None;
        let mut translated = Vec::with_capacity(events.len());
        for event in events {
            let event = match event {
                InputEvent::PointerMoved(m) => {
                    let local = to_local(Vec2::new(m.x, m.y));
                    update_focus = true;
                    seen_pointer = Some(local);
                    InputEvent::PointerMoved(PointerMoveEvent {
                        x: local.x,
                        y: local.y,
                        dx: m.dx,
                        dy: m.dy,
                    })
                }
                InputEvent::PointerButton(b) => {
                    let local = to_local(Vec2::new(b.x, b.y));
                    InputEvent::PointerButton(PointerButtonEvent {
                        x: local.x,
                        y: local.y,
                        ..*b
                    })
                }
                other => other.clone(),
            };
            translated.push(event);
        }

        let pointer = {
            let guard = self.core.lock();
            let mut core = guard.borrow_mut();
            if seen_pointer.is_some() {
                core.last_pointer = seen_pointer;
            }
            if update_focus && core.last_pointer.is_none() {
                // No pointer position has ever been seen; keep the
                // recompute pending instead of guessing.
                core.focus_dirty = pending;
                update_focus = false;
            }
            core.last_pointer
        };

        // Topmost child first: deliver the batch, then check whether the
        // child claims one of the two focus slots.
        let mut depth: usize = 0;
        for child in children.iter().rev() {
            child.process_input(&translated, painter);

            if !update_focus || depth >= 2 {
                continue;
            }
            let Some(point) = pointer else { continue };
            if !child.point_inside(point) {
                continue;
            }

            if depth == 0 {
                let previous = {
                    let guard = self.core.lock();
                    let p = guard.borrow().focused[0].clone();
                    p
                };
                let changed = !previous.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, child));
                if changed {
                    if let Some(prev) = previous {
                        prev.set_focus(false);
                    }
                    {
                        let guard = self.core.lock();
                        guard.borrow_mut().focused[0] = Some(child.clone());
                    }
                    child.set_focus(true);
                }
            } else {
                let guard = self.core.lock();
                guard.borrow_mut().focused[1] = Some(child.clone());
            }
            depth += 1;
        }

        // Slots the pass did not refill lost the pointer; only slot 0
        // was ever told it had focus, so only it is told otherwise.
        if update_focus {
            let dropped = {
                let guard = self.core.lock();
                let mut core = guard.borrow_mut();
                let mut notified = None;
                for index in depth..2 {
                    let taken = core.focused[index].take();
                    if index == 0 {
                        notified = taken;
                    }
                }
                notified
            };
            if let Some(element) = dropped {
                element.set_focus(false);
            }
        }
    }

    fn reset_input(&self) {
        for child in self.children() {
            child.reset_input();
        }
    }

    fn advance_time(&self, delta_ms: u32) {
        for child in self.children() {
            child.advance_time(delta_ms);
        }
    }

    fn reset_time(&self) {
        for child in self.children() {
            child.reset_time();
        }
    }

    /// Gaining focus schedules a slot recompute; losing it empties the
    /// slots so the subtree goes quiet.
    fn focus_changed(&self, has_focus: bool) {
        if has_focus {
            self.mark_focus_dirty();
            return;
        }
        let notified = {
            let guard = self.core.lock();
            let mut core = guard.borrow_mut();
            let first = core.focused[0].take();
            core.focused[1] = None;
            first
        };
        if let Some(element) = notified {
            element.set_focus(false);
        }
    }

    /// Resizing invalidates the backing target; the swap happens on the
    /// next render, which is the first point with renderer access.
    fn set_rect(&self, rect: Rect) {
        if rect.size != self.rect().size {
            let mut backing = self.backing.lock();
            if backing.texture.is_some() {
                backing.recreate = true;
            }
        }
        self.base.store_rect(rect);
    }
}
