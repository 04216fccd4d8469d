//! Two-axis scroll bar: a track with a grip riding on it.
//!
//! The grip's position is normalized to `[0, 1]` per axis over the free
//! run (track size minus grip size); an axis with no free run is pinned to
//! zero. The grip is not a child element. It keeps its own callback table
//! and hover state inside the bar, and the bar routes input to the grip's
//! table or the track's (the element's own) depending on where the pointer
//! sits. Element-level [`Element::bind`] addresses the track.

use parking_lot::Mutex;

use pergola_core::coords::{Rect, Vec2};
use pergola_core::input::{InputEvent, KeyState, MouseButton, MouseButtonState};
use pergola_core::render::TextureId;

use crate::element::{Element, ElementBase, EventCallback, EventKind};
use crate::painter::Painter;

/// Addressable parts of a [`ScrollBar`] for event binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPart {
    Track,
    Grip,
}

struct BarSkin {
    track_texture: TextureId,
    track_src: Option<Rect>,
    grip_texture: TextureId,
    grip_src: Option<Rect>,
}

struct GripState {
    callbacks: [Option<EventCallback>; EventKind::COUNT],
    has_focus: bool,
    update_focus: bool,
    moving: bool,
    pos: Vec2,
    size: Vec2,
    last_point: Option<Vec2>,
}

pub struct ScrollBar {
    base: ElementBase,
    skin: Mutex<BarSkin>,
    grip: Mutex<GripState>,
}

fn clamp_axis(value: f32, free_run: f32) -> f32 {
    if free_run <= 0.0 || value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn event_point(event: &InputEvent) -> Option<Vec2> {
    match event {
        InputEvent::PointerMoved(m) => Some(Vec2::new(m.x, m.y)),
        InputEvent::PointerButton(b) => Some(Vec2::new(b.x, b.y)),
        _ => None,
    }
}

impl ScrollBar {
    pub fn new(track_texture: TextureId, grip_texture: TextureId) -> Self {
        Self {
            base: ElementBase::new(),
            skin: Mutex::new(BarSkin {
                track_texture,
                track_src: None,
                grip_texture,
                grip_src: None,
            }),
            grip: Mutex::new(GripState {
                callbacks: [const { None }; EventKind::COUNT],
                has_focus: false,
                update_focus: true,
                moving: false,
                pos: Vec2::ZERO,
                size: Vec2::ZERO,
                last_point: None,
            }),
        }
    }

    pub fn track_texture(&self) -> TextureId {
        self.skin.lock().track_texture
    }

    pub fn set_track_texture(&self, texture: TextureId) {
        self.skin.lock().track_texture = texture;
    }

    pub fn track_src_rect(&self) -> Option<Rect> {
        self.skin.lock().track_src
    }

    pub fn set_track_src_rect(&self, src: Option<Rect>) {
        self.skin.lock().track_src = src;
    }

    pub fn grip_texture(&self) -> TextureId {
        self.skin.lock().grip_texture
    }

    pub fn set_grip_texture(&self, texture: TextureId) {
        self.skin.lock().grip_texture = texture;
    }

    pub fn grip_src_rect(&self) -> Option<Rect> {
        self.skin.lock().grip_src
    }

    pub fn set_grip_src_rect(&self, src: Option<Rect>) {
        self.skin.lock().grip_src = src;
    }

    /// Normalized grip position over the free run, per axis.
    pub fn grip_position(&self) -> Vec2 {
        self.grip.lock().pos
    }

    /// Moves the grip. Input is clamped to `[0, 1]` per axis and pinned to
    /// zero on axes with no free run; fires the grip's
    /// [`EventKind::ValueChanged`] on every call and schedules a grip
    /// hover recheck.
    pub fn set_grip_position(&self, pos: Vec2) {
        let rect = self.rect();
        {
            let mut grip = self.grip.lock();
            let free = rect.size - grip.size;
            grip.pos = Vec2::new(clamp_axis(pos.x, free.x), clamp_axis(pos.y, free.y));
            grip.update_focus = true;
        }
        self.invoke_grip(EventKind::ValueChanged, None);
    }

    pub fn grip_size(&self) -> Vec2 {
        self.grip.lock().size
    }

    /// Resizes the grip, clamped to the track.
    pub fn set_grip_size(&self, size: Vec2) {
        let rect = self.rect();
        let mut grip = self.grip.lock();
        grip.size = Vec2::new(size.x.min(rect.size.x), size.y.min(rect.size.y));
        grip.update_focus = true;
    }

    /// The grip's rect in the bar's parent frame, derived from the
    /// normalized position and rotated with the bar.
    pub fn grip_rect(&self) -> Rect {
        let rect = self.rect();
        let (pos, size) = {
            let grip = self.grip.lock();
            (grip.pos, grip.size)
        };
        let offset = Vec2::new(
            pos.x * (rect.size.x - size.x),
            pos.y * (rect.size.y - size.y),
        );
        let origin = rect.origin + offset.rotated_about(self.angle(), Vec2::ZERO);
        Rect::from_origin_size(origin, size)
    }

    /// Hit test against the grip, in the same frame pointer events arrive
    /// in.
    pub fn point_in_grip(&self, point: Vec2) -> bool {
        let rect = self.rect();
        let (pos, size) = {
            let grip = self.grip.lock();
            (grip.pos, grip.size)
        };
        let unrotated = Rect::from_origin_size(
            Vec2::new(
                rect.origin.x + (rect.size.x - size.x) * pos.x,
                rect.origin.y + (rect.size.y - size.y) * pos.y,
            ),
            size,
        );
        let local = point.rotated_about(-self.angle(), rect.origin);
        unrotated.rounded_contains(local)
    }

    /// Binds a callback on the track's or the grip's table.
    pub fn bind_part(&self, part: ScrollPart, kind: EventKind, callback: EventCallback) {
        match part {
            ScrollPart::Track => self.bind(kind, callback),
            ScrollPart::Grip => {
                self.grip.lock().callbacks[kind as usize] = Some(callback);
            }
        }
    }

    pub fn unbind_part(&self, part: ScrollPart, kind: EventKind) {
        match part {
            ScrollPart::Track => self.unbind(kind),
            ScrollPart::Grip => {
                self.grip.lock().callbacks[kind as usize] = None;
            }
        }
    }

    fn invoke_grip(&self, kind: EventKind, event: Option<&InputEvent>) {
        let callback = self.grip.lock().callbacks[kind as usize].clone();
        if let Some(callback) = callback {
            callback(self.as_element(), event);
        }
    }

    /// Dispatches to the grip's table when the grip is hovered, the
    /// track's otherwise.
    fn route(&self, kind: EventKind, event: Option<&InputEvent>) {
        if self.grip.lock().has_focus {
            self.invoke_grip(kind, event);
        } else {
            self.base.invoke(self.as_element(), kind, event);
        }
    }

    fn recompute_grip_focus(&self, point: Vec2, event: Option<&InputEvent>) {
        let hovered = self.point_in_grip(point);
        let before = self.grip.lock().has_focus;
        if before == hovered {
            return;
        }
        let kind = if before {
            EventKind::FocusLost
        } else {
            EventKind::FocusGained
        };
        self.invoke_grip(kind, event);
        self.grip.lock().has_focus = hovered;
    }

    /// Steps the grip one grip-length toward a click on the track.
    fn jump_toward(&self, point: Vec2) {
        let rect = self.rect();
        let (pos, size) = {
            let grip = self.grip.lock();
            (grip.pos, grip.size)
        };
        let free = rect.size - size;
        let local = point.rotated_about(-self.angle(), rect.origin) - rect.origin;
        let grip_center = Vec2::new(
            pos.x * free.x + size.x / 2.0,
            pos.y * free.y + size.y / 2.0,
        );

        // Scroll axis: the first axis the grip does not fill.
        let mut direction = Vec2::ZERO;
        if size.x < rect.size.x {
            direction.x = local.x - grip_center.x;
        } else if size.y < rect.size.y {
            direction.y = local.y - grip_center.y;
        }
        let length = (direction.x * direction.x + direction.y * direction.y).sqrt();
        if length <= 0.0 {
            return;
        }
        let unit = direction / length;
        let step = Vec2::new(
            if free.x > 0.0 { unit.x * size.x / free.x } else { 0.0 },
            if free.y > 0.0 { unit.y * size.y / free.y } else { 0.0 },
        );
        self.set_grip_position(pos + step);
    }

    fn drag_by(&self, dx: f32, dy: f32) {
        let delta = Vec2::new(dx, dy).rotated_about(-self.angle(), Vec2::ZERO);
        let rect = self.rect();
        let size = self.grip.lock().size;
        let free = rect.size - size;
        let step = Vec2::new(
            if free.x > 0.0 { delta.x / free.x } else { 0.0 },
            if free.y > 0.0 { delta.y / free.y } else { 0.0 },
        );
        self.set_grip_position(self.grip_position() + step);
    }
}

impl Element for ScrollBar {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    fn render(&self, painter: &mut Painter<'_>) {
        let (track_texture, track_src, grip_texture, grip_src) = {
            let skin = self.skin.lock();
            (
                skin.track_texture,
                skin.track_src,
                skin.grip_texture,
                skin.grip_src,
            )
        };
        let angle = self.angle();
        let flip = self.flip();
        painter
            .gfx
            .draw_texture(track_texture, track_src, self.rect(), angle, flip);
        painter
            .gfx
            .draw_texture(grip_texture, grip_src, self.grip_rect(), angle, flip);
    }

    fn process_input(&self, events: &[InputEvent], _painter: &mut Painter<'_>) {
        for event in events {
            // Last reported pointer position feeds hover rechecks caused
            // by non-pointer events.
            if let Some(point) = event_point(event) {
                self.grip.lock().last_point = Some(point);
            }

            if self.has_focus() {
                match event {
                    InputEvent::Key {
                        state: KeyState::Pressed,
                        ..
                    } => self.route(EventKind::KeyDown, Some(event)),
                    InputEvent::Key {
                        state: KeyState::Released,
                        ..
                    } => self.route(EventKind::KeyUp, Some(event)),
                    InputEvent::MouseWheel { .. } => {
                        self.route(EventKind::MouseWheel, Some(event))
                    }
                    InputEvent::PointerMoved(m) => {
                        self.grip.lock().update_focus = false;
                        self.recompute_grip_focus(Vec2::new(m.x, m.y), Some(event));
                        self.route(EventKind::MouseMotion, Some(event));
                    }
                    InputEvent::PointerButton(b) => {
                        if b.button == MouseButton::Left
                            && b.state == MouseButtonState::Pressed
                        {
                            if self.grip.lock().has_focus {
                                self.grip.lock().moving = true;
                            } else {
                                self.jump_toward(Vec2::new(b.x, b.y));
                            }
                        }
                        if let Some(kind) = EventKind::for_button(b.button, b.state) {
                            self.route(kind, None);
                        }
                        let generic = match b.state {
                            MouseButtonState::Pressed => EventKind::MouseDown,
                            MouseButtonState::Released => EventKind::MouseUp,
                        };
                        self.route(generic, Some(event));
                    }
                    _ => {}
                }
            }

            // Drag bookkeeping outlives the bar's hover focus.
            if let InputEvent::PointerButton(b) = event {
                if b.button == MouseButton::Left && b.state == MouseButtonState::Released {
                    self.grip.lock().moving = false;
                }
            }
            if let InputEvent::PointerMoved(m) = event {
                if self.grip.lock().moving {
                    self.drag_by(m.dx, m.dy);
                }
            }

            // Deferred hover recheck after the grip moved or resized under
            // a stationary pointer. Stays pending until a pointer position
            // has been seen.
            let pending = self.grip.lock().update_focus;
            if pending {
                let point = self.grip.lock().last_point;
                if let Some(point) = point {
                    self.grip.lock().update_focus = false;
                    self.recompute_grip_focus(point, Some(event));
                }
            }
        }
    }

    fn reset_input(&self) {
        self.grip.lock().moving = false;
        self.set_grip_position(Vec2::ZERO);
    }

    fn set_rect(&self, rect: Rect) {
        self.base.store_rect(rect);
        let mut grip = self.grip.lock();
        grip.size = Vec2::new(grip.size.x.min(rect.size.x), grip.size.y.min(rect.size.y));
    }

    fn set_angle(&self, degrees: f32) {
        self.base.store_angle(degrees);
        // Keeps the derived grip geometry and hover state current.
        let pos = self.grip_position();
        self.set_grip_position(pos);
    }
}
