//! Shared fixtures for the crate's tests: a bare probe element, a
//! call-recording renderer, a fixed-advance text shaper, and an in-memory
//! clipboard.

use std::sync::Arc;

use parking_lot::Mutex;

use pergola_core::coords::{ColorRgba, Rect, Vec2};
use pergola_core::input::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
    PointerMoveEvent,
};
use pergola_core::render::{Flip, Renderer, TextImage, TextureId};
use pergola_core::text::{FontId, TextShaper};

use crate::clipboard::Clipboard;
use crate::element::{Element, ElementBase, ElementRef, EventCallback};
use crate::painter::Painter;

/// Fixed per-character advance used by [`MonoShaper`].
pub(crate) const ADVANCE: f32 = 8.0;

/// Minimal element: base behavior plus a rect-filling render so backing
/// targets show where children landed.
pub(crate) struct Probe {
    base: ElementBase,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            base: ElementBase::new(),
        }
    }
}

impl Element for Probe {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    fn render(&self, painter: &mut Painter<'_>) {
        painter.gfx.fill_rect(self.rect(), ColorRgba::white());
    }
}

/// Handle identity across the `Arc<dyn Element>` erasure.
pub(crate) fn same<T: Element>(erased: &ElementRef, concrete: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(erased), Arc::as_ptr(concrete))
}

/// Equality comparisons on focus-slot arrays in tests need
/// `PartialEq`/`Debug` for the erased element type; equality is handle
/// identity, matching the crate's identity rules.
impl PartialEq for dyn Element {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(self, other)
    }
}

impl std::fmt::Debug for dyn Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Element({:p})", self)
    }
}

// ── event shorthand ───────────────────────────────────────────────────────

pub(crate) fn motion(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMoved(PointerMoveEvent {
        x,
        y,
        dx: 0.0,
        dy: 0.0,
    })
}

pub(crate) fn motion_by(x: f32, y: f32, dx: f32, dy: f32) -> InputEvent {
    InputEvent::PointerMoved(PointerMoveEvent { x, y, dx, dy })
}

pub(crate) fn pressed(button: MouseButton, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerButton(PointerButtonEvent {
        button,
        state: MouseButtonState::Pressed,
        x,
        y,
        modifiers: Modifiers::default(),
    })
}

pub(crate) fn released(button: MouseButton, x: f32, y: f32) -> InputEvent {
    InputEvent::PointerButton(PointerButtonEvent {
        button,
        state: MouseButtonState::Released,
        x,
        y,
        modifiers: Modifiers::default(),
    })
}

pub(crate) fn key(k: Key) -> InputEvent {
    key_with(k, Modifiers::default())
}

pub(crate) fn key_with(k: Key, modifiers: Modifiers) -> InputEvent {
    InputEvent::Key {
        key: k,
        state: KeyState::Pressed,
        modifiers,
        code: 0,
        repeat: false,
    }
}

pub(crate) fn text(s: &str) -> InputEvent {
    InputEvent::Text(pergola_core::input::TextEvent {
        text: s.to_string(),
    })
}

pub(crate) fn composition(s: &str, cursor: Option<usize>) -> InputEvent {
    InputEvent::Composition(pergola_core::input::CompositionEvent {
        text: s.to_string(),
        cursor,
    })
}

pub(crate) fn shift() -> Modifiers {
    Modifiers {
        shift: true,
        ..Modifiers::default()
    }
}

pub(crate) fn ctrl() -> Modifiers {
    Modifiers {
        ctrl: true,
        ..Modifiers::default()
    }
}

/// Runs one input pass with a throwaway renderer.
pub(crate) fn frame(element: &dyn Element, events: &[InputEvent]) {
    let mut gfx = RecordingGfx::new();
    gfx.process(element, events);
}

// ── callback recording ────────────────────────────────────────────────────

/// Collects tags pushed by callbacks, in firing order.
#[derive(Default, Clone)]
pub(crate) struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn callback(&self, tag: &str) -> EventCallback {
        let entries = self.entries.clone();
        let tag = tag.to_string();
        Arc::new(move |_element, _event| entries.lock().push(tag.clone()))
    }

    /// Like [`callback`](Self::callback) but tags whether a payload came
    /// along.
    pub fn payload_callback(&self, tag: &str) -> EventCallback {
        let entries = self.entries.clone();
        let tag = tag.to_string();
        Arc::new(move |_element, event| {
            let suffix = if event.is_some() { "event" } else { "none" };
            entries.lock().push(format!("{tag}:{suffix}"));
        })
    }

    /// Records motion payload coordinates as `"x,y"`, rounded.
    pub fn motion_callback(&self) -> EventCallback {
        let entries = self.entries.clone();
        Arc::new(move |_element, event| {
            if let Some(InputEvent::PointerMoved(m)) = event {
                entries
                    .lock()
                    .push(format!("{},{}", m.x.round() as i32, m.y.round() as i32));
            }
        })
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn count(&self, tag: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == tag).count()
    }
}

// ── renderer mock ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GfxCall {
    CreateTarget {
        width: u32,
        height: u32,
        id: TextureId,
    },
    Destroy(TextureId),
    PushTarget(TextureId),
    PopTarget,
    Clear(ColorRgba),
    FillRect {
        rect: Rect,
        color: ColorRgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
    },
    Draw {
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle: f32,
        flip: Flip,
    },
    Upload {
        id: TextureId,
        width: u32,
        height: u32,
    },
}

/// Renderer that records every call and mints sequential texture ids.
pub(crate) struct RecordingGfx {
    pub calls: Vec<GfxCall>,
    next_id: u64,
}

impl RecordingGfx {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            next_id: 1,
        }
    }

    fn mint(&mut self) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Runs `element.render` with this renderer and a [`MonoShaper`].
    pub fn render(&mut self, element: &dyn Element) {
        let shaper = MonoShaper::new(ADVANCE);
        let mut painter = Painter::new(self, &shaper);
        element.render(&mut painter);
    }

    /// Runs `element.process_input` with this renderer and a
    /// [`MonoShaper`].
    pub fn process(&mut self, element: &dyn Element, events: &[InputEvent]) {
        let shaper = MonoShaper::new(ADVANCE);
        let mut painter = Painter::new(self, &shaper);
        element.process_input(events, &mut painter);
    }

    pub fn created_targets(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GfxCall::CreateTarget { .. }))
            .count()
    }

    pub fn destroyed(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GfxCall::Destroy(_)))
            .count()
    }

    pub fn uploads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GfxCall::Upload { .. }))
            .count()
    }

    pub fn fill_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GfxCall::FillRect { .. }))
            .count()
    }

    pub fn fills(&self) -> Vec<(Rect, ColorRgba)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::FillRect { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn last_fill_rect(&self) -> Option<Rect> {
        self.calls.iter().rev().find_map(|c| match c {
            GfxCall::FillRect { rect, .. } => Some(*rect),
            _ => None,
        })
    }

    pub fn draws(&self) -> Vec<(TextureId, Option<Rect>, Rect, f32, Flip)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::Draw {
                    texture,
                    src,
                    dst,
                    angle,
                    flip,
                } => Some((*texture, *src, *dst, *angle, *flip)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingGfx {
    fn create_target(&mut self, width: u32, height: u32) -> Option<TextureId> {
        let id = self.mint();
        self.calls.push(GfxCall::CreateTarget { width, height, id });
        Some(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.calls.push(GfxCall::Destroy(texture));
    }

    fn push_target(&mut self, target: TextureId) {
        self.calls.push(GfxCall::PushTarget(target));
    }

    fn pop_target(&mut self) {
        self.calls.push(GfxCall::PopTarget);
    }

    fn clear(&mut self, color: ColorRgba) {
        self.calls.push(GfxCall::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: ColorRgba) {
        self.calls.push(GfxCall::FillRect { rect, color });
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, _color: ColorRgba) {
        self.calls.push(GfxCall::Line { from, to });
    }

    fn draw_texture(
        &mut self,
        texture: TextureId,
        src: Option<Rect>,
        dst: Rect,
        angle: f32,
        flip: Flip,
    ) {
        self.calls.push(GfxCall::Draw {
            texture,
            src,
            dst,
            angle,
            flip,
        });
    }

    fn upload_text(&mut self, image: &TextImage) -> Option<TextureId> {
        let id = self.mint();
        self.calls.push(GfxCall::Upload {
            id,
            width: image.width,
            height: image.height,
        });
        Some(id)
    }
}

// ── text shaper mock ──────────────────────────────────────────────────────

/// Shaper where every character is `advance` wide and a line is exactly
/// `px` tall, so layout math in tests stays in whole numbers.
pub(crate) struct MonoShaper {
    advance: f32,
}

impl MonoShaper {
    pub const fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextShaper for MonoShaper {
    fn measure(&self, text: &str, _font: FontId, px: f32) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * self.advance, px)
    }

    fn rasterize(
        &self,
        text: &str,
        font: FontId,
        px: f32,
        _color: ColorRgba,
    ) -> Option<TextImage> {
        if text.is_empty() {
            return None;
        }
        let size = self.measure(text, font, px);
        let width = size.x.ceil() as u32;
        let height = size.y.ceil() as u32;
        Some(TextImage {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        })
    }
}

// ── clipboard mock ────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct FakeClipboard {
    contents: Mutex<Option<String>>,
}

impl Clipboard for FakeClipboard {
    fn get_text(&self) -> Option<String> {
        self.contents.lock().clone()
    }

    fn set_text(&self, text: &str) {
        *self.contents.lock() = Some(text.to_string());
    }
}
