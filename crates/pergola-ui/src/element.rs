//! Element base contract.
//!
//! Everything that can sit in a [`Set`] implements [`Element`]: a rect with
//! a rotation angle and flip, a focus flag, and a table with one optional
//! callback per [`EventKind`]. The trait's provided methods carry the whole
//! base behavior; widgets embed an [`ElementBase`] and override only what
//! they extend.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use pergola_ui::prelude::*;
//!
//! let button = Arc::new(Button::new(texture));
//! button.set_rect(Rect::new(10.0, 10.0, 80.0, 24.0));
//! button.bind(
//!     EventKind::LeftUp,
//!     Arc::new(|_element, _event| println!("clicked!")),
//! );
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;

use pergola_core::coords::{Rect, Vec2};
use pergola_core::input::{InputEvent, KeyState, MouseButton, MouseButtonState};
use pergola_core::render::Flip;

use crate::painter::Painter;
use crate::set::Set;

/// Shared handle to any element.
///
/// Identity (duplicate checks, focus bookkeeping) is handle identity via
/// [`Arc::ptr_eq`].
pub type ElementRef = Arc<dyn Element>;

/// Callback invoked when a bound event fires.
///
/// Receives the element the event fired on and, for events carrying input
/// data (generic mouse/key/wheel/motion), the triggering event. Focus,
/// value-changed, and specific-button callbacks receive `None`.
pub type EventCallback = Arc<dyn Fn(&dyn Element, Option<&InputEvent>) + Send + Sync>;

/// The closed set of bindable events.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EventKind {
    FocusGained,
    FocusLost,
    ValueChanged,
    LeftDown,
    LeftUp,
    MiddleDown,
    MiddleUp,
    RightDown,
    RightUp,
    Extra1Down,
    Extra1Up,
    Extra2Down,
    Extra2Up,
    MouseDown,
    MouseUp,
    MouseMotion,
    MouseWheel,
    KeyDown,
    KeyUp,
}

impl EventKind {
    pub const COUNT: usize = EventKind::KeyUp as usize + 1;

    /// Specific-button kind for a press/release, `None` for buttons with
    /// no dedicated slot.
    pub(crate) fn for_button(button: MouseButton, state: MouseButtonState) -> Option<EventKind> {
        use MouseButtonState::{Pressed, Released};
        Some(match (button, state) {
            (MouseButton::Left, Pressed) => EventKind::LeftDown,
            (MouseButton::Left, Released) => EventKind::LeftUp,
            (MouseButton::Middle, Pressed) => EventKind::MiddleDown,
            (MouseButton::Middle, Released) => EventKind::MiddleUp,
            (MouseButton::Right, Pressed) => EventKind::RightDown,
            (MouseButton::Right, Released) => EventKind::RightUp,
            (MouseButton::Back, Pressed) => EventKind::Extra1Down,
            (MouseButton::Back, Released) => EventKind::Extra1Up,
            (MouseButton::Forward, Pressed) => EventKind::Extra2Down,
            (MouseButton::Forward, Released) => EventKind::Extra2Up,
            (MouseButton::Other(_), _) => return None,
        })
    }
}

struct BaseState {
    rect: Rect,
    angle: f32,
    flip: Flip,
    has_focus: bool,
    parent: Option<Weak<Set>>,
    callbacks: [Option<EventCallback>; EventKind::COUNT],
}

/// State every element shares: geometry, focus, parent link, callbacks.
///
/// Guarded by a reentrant lock so callbacks may call back into the element
/// (or its container) on the dispatching thread. The cell borrow is never
/// held across a callback.
pub struct ElementBase {
    state: ReentrantMutex<RefCell<BaseState>>,
}

impl ElementBase {
    pub fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(BaseState {
                rect: Rect::default(),
                angle: 0.0,
                flip: Flip::None,
                has_focus: false,
                parent: None,
                callbacks: [const { None }; EventKind::COUNT],
            })),
        }
    }

    /// Fires the callback bound to `kind`, if any.
    ///
    /// `origin` is the element handed to the callback; widgets pass
    /// themselves when reporting their own events.
    pub fn invoke(&self, origin: &dyn Element, kind: EventKind, event: Option<&InputEvent>) {
        let callback = {
            let guard = self.state.lock();
            let cb = guard.borrow().callbacks[kind as usize].clone();
            cb
        };
        if let Some(cb) = callback {
            cb(origin, event);
        }
    }

    /// Base per-event dispatch: while focused, button events fire their
    /// specific slot (no payload) then the generic slot (with payload);
    /// motion/wheel/key events fire their generic slot. Focus is
    /// re-checked per event so a callback dropping focus mid-batch stops
    /// later dispatch.
    pub fn dispatch_batch(&self, origin: &dyn Element, events: &[InputEvent]) {
        for ev in events {
            if !self.focus_flag() {
                continue;
            }
            match ev {
                InputEvent::PointerButton(pb) => {
                    if let Some(kind) = EventKind::for_button(pb.button, pb.state) {
                        self.invoke(origin, kind, None);
                    }
                    let generic = match pb.state {
                        MouseButtonState::Pressed => EventKind::MouseDown,
                        MouseButtonState::Released => EventKind::MouseUp,
                    };
                    self.invoke(origin, generic, Some(ev));
                }
                InputEvent::PointerMoved(_) => {
                    self.invoke(origin, EventKind::MouseMotion, Some(ev));
                }
                InputEvent::MouseWheel { .. } => {
                    self.invoke(origin, EventKind::MouseWheel, Some(ev));
                }
                InputEvent::Key {
                    state: KeyState::Pressed,
                    ..
                } => {
                    self.invoke(origin, EventKind::KeyDown, Some(ev));
                }
                InputEvent::Key {
                    state: KeyState::Released,
                    ..
                } => {
                    self.invoke(origin, EventKind::KeyUp, Some(ev));
                }
                _ => {}
            }
        }
    }

    fn focus_flag(&self) -> bool {
        let guard = self.state.lock();
        let f = guard.borrow().has_focus;
        f
    }

    /// Stores the focus flag without firing callbacks. Containers use this
    /// for their initial root focus.
    pub(crate) fn set_focus_raw(&self, flag: bool) {
        let guard = self.state.lock();
        guard.borrow_mut().has_focus = flag;
    }

    pub(crate) fn parent(&self) -> Option<Arc<Set>> {
        let weak = {
            let guard = self.state.lock();
            let w = guard.borrow().parent.clone();
            w
        };
        weak.and_then(|w| w.upgrade())
    }

    pub(crate) fn set_parent(&self, parent: Option<Weak<Set>>) {
        let guard = self.state.lock();
        guard.borrow_mut().parent = parent;
    }

    /// Clears and returns the current parent, without telling it.
    /// `Set::attach` uses this to reparent without mutual recursion.
    pub(crate) fn take_parent(&self) -> Option<Arc<Set>> {
        let weak = {
            let guard = self.state.lock();
            let w = guard.borrow_mut().parent.take();
            w
        };
        weak.and_then(|w| w.upgrade())
    }

    fn notify_parent_geometry(&self) {
        if let Some(parent) = self.parent() {
            parent.mark_focus_dirty();
        }
    }

    /// Stores the rect and tells the owning container that focus geometry
    /// may be stale. Widgets overriding [`Element::set_rect`] call this
    /// for the base behavior.
    pub(crate) fn store_rect(&self, rect: Rect) {
        {
            let guard = self.state.lock();
            guard.borrow_mut().rect = rect;
        }
        self.notify_parent_geometry();
    }

    /// Rect-store counterpart for the rotation angle.
    pub(crate) fn store_angle(&self, degrees: f32) {
        {
            let guard = self.state.lock();
            guard.borrow_mut().angle = degrees;
        }
        self.notify_parent_geometry();
    }

    /// Mirroring does not affect hit geometry, so no container notify.
    pub(crate) fn store_flip(&self, flip: Flip) {
        let guard = self.state.lock();
        guard.borrow_mut().flip = flip;
    }
}

impl Default for ElementBase {
    fn default() -> Self {
        Self::new()
    }
}

/// A renderable, input-reactive unit inside a [`Set`].
///
/// Implementations supply [`base`](Element::base) and
/// [`as_element`](Element::as_element) and override the per-frame hooks
/// they care about; the rest of the surface is provided.
pub trait Element: Any + Send + Sync {
    /// The shared base state.
    fn base(&self) -> &ElementBase;

    /// `self` as a trait object; used when handing the element to its own
    /// callbacks. Implementations return `self`.
    fn as_element(&self) -> &dyn Element;

    /// Draws the element. Base elements draw nothing.
    fn render(&self, painter: &mut Painter<'_>) {
        let _ = painter;
    }

    /// Processes one frame's worth of input events, already translated
    /// into this element's parent frame.
    fn process_input(&self, events: &[InputEvent], painter: &mut Painter<'_>) {
        let _ = painter;
        self.base().dispatch_batch(self.as_element(), events);
    }

    /// Reverts transient input state (drags, selections, entered text).
    fn reset_input(&self) {}

    /// Advances time-driven state by `delta_ms` milliseconds.
    fn advance_time(&self, delta_ms: u32) {
        let _ = delta_ms;
    }

    /// Reverts time-driven state.
    fn reset_time(&self) {}

    /// Hook invoked after the focus flag changes, with the new value.
    fn focus_changed(&self, has_focus: bool) {
        let _ = has_focus;
    }

    // ── provided surface ──────────────────────────────────────────────────

    fn rect(&self) -> Rect {
        let guard = self.base().state.lock();
        let r = guard.borrow().rect;
        r
    }

    /// Sets the element's rect and tells the owning container that focus
    /// geometry may be stale.
    fn set_rect(&self, rect: Rect) {
        self.base().store_rect(rect);
    }

    fn angle(&self) -> f32 {
        let guard = self.base().state.lock();
        let a = guard.borrow().angle;
        a
    }

    /// Sets the rotation in degrees about the rect's top-left corner.
    fn set_angle(&self, degrees: f32) {
        self.base().store_angle(degrees);
    }

    fn flip(&self) -> Flip {
        let guard = self.base().state.lock();
        let f = guard.borrow().flip;
        f
    }

    fn set_flip(&self, flip: Flip) {
        self.base().store_flip(flip);
    }

    fn has_focus(&self) -> bool {
        self.base().focus_flag()
    }

    /// Updates the focus flag. On change, the callback for the new state
    /// fires first (observing the old flag), then the flag is stored, then
    /// [`focus_changed`](Element::focus_changed) runs.
    fn set_focus(&self, flag: bool) {
        let base = self.base();
        let changed = {
            let guard = base.state.lock();
            let c = guard.borrow().has_focus != flag;
            c
        };
        if !changed {
            return;
        }

        let kind = if flag {
            EventKind::FocusGained
        } else {
            EventKind::FocusLost
        };
        base.invoke(self.as_element(), kind, None);

        {
            let guard = base.state.lock();
            guard.borrow_mut().has_focus = flag;
        }
        self.focus_changed(flag);
    }

    /// Binds `callback` to `kind`, replacing any previous binding.
    fn bind(&self, kind: EventKind, callback: EventCallback) {
        let guard = self.base().state.lock();
        guard.borrow_mut().callbacks[kind as usize] = Some(callback);
    }

    /// Removes the binding for `kind`, if any.
    fn unbind(&self, kind: EventKind) {
        let guard = self.base().state.lock();
        guard.borrow_mut().callbacks[kind as usize] = None;
    }

    /// Hit-test against the element's rotated rect.
    ///
    /// `p` is inverse-rotated about the rect origin, then point and rect
    /// are rounded to whole pixels for a half-open test.
    fn point_inside(&self, p: Vec2) -> bool {
        let (rect, angle) = {
            let guard = self.base().state.lock();
            let s = guard.borrow();
            (s.rect, s.angle)
        };
        let local = p.rotated_about(-angle, rect.origin);
        rect.rounded_contains(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CallLog, Probe, pressed, released};
    use pergola_core::input::PointerMoveEvent;

    fn motion(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent {
            x,
            y,
            dx: 0.0,
            dy: 0.0,
        })
    }

    // ── callbacks ─────────────────────────────────────────────────────────

    #[test]
    fn bind_replaces_and_unbind_clears() {
        let probe = Probe::new();
        let log = CallLog::default();

        probe.bind(EventKind::ValueChanged, log.callback("first"));
        probe.bind(EventKind::ValueChanged, log.callback("second"));
        probe.base().invoke(&probe, EventKind::ValueChanged, None);
        assert_eq!(log.take(), vec!["second"]);

        probe.unbind(EventKind::ValueChanged);
        probe.base().invoke(&probe, EventKind::ValueChanged, None);
        assert!(log.take().is_empty());
    }

    #[test]
    fn button_fires_specific_then_generic() {
        let probe = Probe::new();
        probe.set_focus(true);
        let log = CallLog::default();

        probe.bind(EventKind::LeftDown, log.callback("left"));
        probe.bind(EventKind::MouseDown, log.callback("generic"));

        probe
            .base()
            .dispatch_batch(&probe, &[pressed(MouseButton::Left, 0.0, 0.0)]);
        assert_eq!(log.take(), vec!["left", "generic"]);
    }

    #[test]
    fn specific_slot_gets_no_payload_generic_does() {
        let probe = Probe::new();
        probe.set_focus(true);
        let log = CallLog::default();

        probe.bind(EventKind::LeftUp, log.payload_callback("specific"));
        probe.bind(EventKind::MouseUp, log.payload_callback("generic"));

        probe
            .base()
            .dispatch_batch(&probe, &[released(MouseButton::Left, 0.0, 0.0)]);
        assert_eq!(log.take(), vec!["specific:none", "generic:event"]);
    }

    #[test]
    fn unfocused_element_dispatches_nothing() {
        let probe = Probe::new();
        let log = CallLog::default();
        probe.bind(EventKind::MouseMotion, log.callback("moved"));

        probe.base().dispatch_batch(&probe, &[motion(1.0, 1.0)]);
        assert!(log.take().is_empty());
    }

    #[test]
    fn callback_dropping_focus_stops_later_dispatch() {
        let probe = std::sync::Arc::new(Probe::new());
        probe.set_focus(true);
        let log = CallLog::default();

        probe.bind(
            EventKind::MouseMotion,
            Arc::new(move |el, _| el.set_focus(false)),
        );
        probe.bind(EventKind::KeyUp, log.callback("key"));

        let events = [
            motion(1.0, 1.0),
            InputEvent::Key {
                key: pergola_core::input::Key::A,
                state: KeyState::Released,
                modifiers: Default::default(),
                code: 0,
                repeat: false,
            },
        ];
        probe.base().dispatch_batch(probe.as_element(), &events);
        assert!(log.take().is_empty());
    }

    // ── focus transitions ─────────────────────────────────────────────────

    #[test]
    fn focus_callback_observes_previous_flag() {
        let probe = Probe::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen2 = seen.clone();

        probe.bind(
            EventKind::FocusGained,
            Arc::new(move |el, _| seen2.lock().unwrap().push(el.has_focus())),
        );

        probe.set_focus(true);
        assert!(probe.has_focus());
        // The gained callback runs before the flag is stored.
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }

    #[test]
    fn redundant_focus_set_is_silent() {
        let probe = Probe::new();
        let log = CallLog::default();
        probe.bind(EventKind::FocusLost, log.callback("lost"));

        probe.set_focus(false);
        assert!(log.take().is_empty());
    }

    // ── hit-testing ───────────────────────────────────────────────────────

    #[test]
    fn point_inside_axis_aligned() {
        let probe = Probe::new();
        probe.set_rect(Rect::new(10.0, 10.0, 20.0, 10.0));

        assert!(probe.point_inside(Vec2::new(11.0, 11.0)));
        assert!(probe.point_inside(Vec2::new(29.0, 19.0)));
        assert!(!probe.point_inside(Vec2::new(31.0, 15.0)));
        assert!(!probe.point_inside(Vec2::new(15.0, 9.0)));
    }

    #[test]
    fn point_inside_tracks_rotation() {
        let probe = Probe::new();
        let rect = Rect::new(5.0, 5.0, 20.0, 10.0);
        probe.set_rect(rect);

        for angle in [0.0f32, 45.0, 90.0, 180.0] {
            probe.set_angle(angle);

            // Local-frame corner nudges, mapped into the rotated frame.
            let inward = [
                Vec2::new(1.0, 1.0),
                Vec2::new(19.0, 1.0),
                Vec2::new(1.0, 9.0),
                Vec2::new(19.0, 9.0),
            ];
            let outward = [
                Vec2::new(-1.0, -1.0),
                Vec2::new(21.0, -1.0),
                Vec2::new(-1.0, 11.0),
                Vec2::new(21.0, 11.0),
            ];

            for local in inward {
                let window = (rect.origin + local).rotated_about(angle, rect.origin);
                assert!(
                    probe.point_inside(window),
                    "angle {angle}: {local:?} should hit"
                );
            }
            for local in outward {
                let window = (rect.origin + local).rotated_about(angle, rect.origin);
                assert!(
                    !probe.point_inside(window),
                    "angle {angle}: {local:?} should miss"
                );
            }
        }
    }
}
