//! Scrolling viewport over an inner content container.
//!
//! The window owns a [`Set`] whose geometry mirrors the window's own; the
//! visible cutout is moved by sliding the inner set's render corner over
//! the declared content size. Wiring a [`ScrollBar`] through
//! [`ScrollWindow::attach_scroll_bar`] drives the position from the grip.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;

use pergola_core::coords::{ColorRgba, Rect, Vec2};
use pergola_core::input::InputEvent;
use pergola_core::render::Flip;

use crate::element::{Element, ElementBase, ElementRef, EventKind};
use crate::painter::Painter;
use crate::set::Set;
use crate::widgets::scroll_bar::{ScrollBar, ScrollPart};

struct WindowState {
    content_size: Vec2,
    position: Vec2,
}

pub struct ScrollWindow {
    base: ElementBase,
    content: Arc<Set>,
    state: Mutex<WindowState>,
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl ScrollWindow {
    /// A window over `content_size` of scrollable area. Starts focused,
    /// like a root [`Set`].
    pub fn new(content_size: Vec2) -> Arc<Self> {
        let window = Arc::new(Self {
            base: ElementBase::new(),
            content: Set::new(),
            state: Mutex::new(WindowState {
                content_size,
                position: Vec2::ZERO,
            }),
        });
        window.base.set_focus_raw(true);
        window
    }

    pub fn content_size(&self) -> Vec2 {
        self.state.lock().content_size
    }

    pub fn set_content_size(&self, size: Vec2) {
        self.state.lock().content_size = size;
        self.apply_scroll();
    }

    /// Normalized position of the viewport over the content, per axis.
    pub fn window_position(&self) -> Vec2 {
        self.state.lock().position
    }

    /// Scrolls the viewport. `(0, 0)` shows the content's top-left corner,
    /// `(1, 1)` its bottom-right. Axes where the content fits stay put.
    pub fn set_window_position(&self, position: Vec2) {
        {
            let mut state = self.state.lock();
            state.position = Vec2::new(clamp_unit(position.x), clamp_unit(position.y));
        }
        self.apply_scroll();
    }

    /// Drives [`set_window_position`](Self::set_window_position) from the
    /// bar's grip.
    pub fn attach_scroll_bar(self: &Arc<Self>, bar: &ScrollBar) {
        let window = Arc::downgrade(self);
        bar.bind_part(
            ScrollPart::Grip,
            EventKind::ValueChanged,
            Arc::new(move |element, _| {
                let Some(window) = window.upgrade() else { return };
                let any: &dyn Any = element;
                if let Some(bar) = any.downcast_ref::<ScrollBar>() {
                    window.set_window_position(bar.grip_position());
                }
            }),
        );
    }

    pub fn attach(&self, element: ElementRef) -> bool {
        self.content.attach(element)
    }

    pub fn attach_many(&self, elements: impl IntoIterator<Item = ElementRef>) -> usize {
        self.content.attach_many(elements)
    }

    pub fn remove(&self, element: &ElementRef) -> bool {
        self.content.remove(element)
    }

    pub fn remove_at(&self, index: usize) -> Option<ElementRef> {
        self.content.remove_at(index)
    }

    pub fn children(&self) -> Vec<ElementRef> {
        self.content.children()
    }

    pub fn background(&self) -> ColorRgba {
        self.content.background()
    }

    pub fn set_background(&self, color: ColorRgba) {
        self.content.set_background(color);
    }

    fn apply_scroll(&self) {
        let viewport = self.rect().size;
        let (content_size, position) = {
            let state = self.state.lock();
            (state.content_size, state.position)
        };
        let overflow = Vec2::new(
            (content_size.x - viewport.x).max(0.0),
            (content_size.y - viewport.y).max(0.0),
        );
        self.content
            .set_render_corner(Vec2::new(-overflow.x * position.x, -overflow.y * position.y));
    }
}

impl Element for ScrollWindow {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    fn render(&self, painter: &mut Painter<'_>) {
        self.content.render(painter);
    }

    fn process_input(&self, events: &[InputEvent], painter: &mut Painter<'_>) {
        self.base.dispatch_batch(self.as_element(), events);
        self.content.process_input(events, painter);
    }

    fn reset_input(&self) {
        self.content.reset_input();
    }

    fn advance_time(&self, delta_ms: u32) {
        self.content.advance_time(delta_ms);
    }

    fn reset_time(&self) {
        self.content.reset_time();
    }

    fn focus_changed(&self, has_focus: bool) {
        self.content.set_focus(has_focus);
    }

    fn set_rect(&self, rect: Rect) {
        self.base.store_rect(rect);
        self.content.set_rect(rect);
        self.apply_scroll();
    }

    fn set_angle(&self, degrees: f32) {
        self.base.store_angle(degrees);
        self.content.set_angle(degrees);
    }

    fn set_flip(&self, flip: Flip) {
        self.base.store_flip(flip);
        self.content.set_flip(flip);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pergola_core::coords::{Rect, Vec2};
    use pergola_core::render::TextureId;

    use super::*;
    use crate::test_support::{frame, motion, pressed, CallLog, Probe, RecordingGfx};
    use pergola_core::input::MouseButton;

    fn window_with_probe() -> (Arc<ScrollWindow>, Arc<Probe>) {
        // 100x100 viewport over 300x100 of content.
        let window = ScrollWindow::new(Vec2::new(300.0, 100.0));
        window.set_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let probe = Arc::new(Probe::new());
        probe.set_rect(Rect::new(250.0, 10.0, 20.0, 20.0));
        window.attach(probe.clone());
        (window, probe)
    }

    // ── scrolling ────────────────────────────────────────────────────────

    #[test]
    fn scrolling_slides_the_content_cutout() {
        let (window, _probe) = window_with_probe();

        window.set_window_position(Vec2::new(1.0, 0.0));

        // 200 px of overflow, fully scrolled.
        assert_eq!(window.children().len(), 1);
        let mut gfx = RecordingGfx::new();
        gfx.render(window.as_element());
        // The probe at content x 250 lands at 50 inside the backing target.
        assert_eq!(gfx.last_fill_rect(), Some(Rect::new(50.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn position_clamps_and_ignores_fitting_axes() {
        let (window, _probe) = window_with_probe();

        window.set_window_position(Vec2::new(2.0, 1.0));

        assert_eq!(window.window_position(), Vec2::new(1.0, 1.0));
        // No vertical overflow: the corner only moves on x.
        assert_eq!(window.content_size(), Vec2::new(300.0, 100.0));
        let mut gfx = RecordingGfx::new();
        gfx.render(window.as_element());
        assert_eq!(gfx.last_fill_rect(), Some(Rect::new(50.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn input_reaches_scrolled_content() {
        let (window, probe) = window_with_probe();
        window.set_window_position(Vec2::new(1.0, 0.0));

        let log = CallLog::default();
        probe.bind(EventKind::LeftDown, log.callback("hit"));

        // The probe shows at viewport x 50..70.
        frame(window.as_element(), &[motion(60.0, 20.0)]);
        frame(window.as_element(), &[pressed(MouseButton::Left, 60.0, 20.0)]);

        assert_eq!(log.count("hit"), 1);
    }

    // ── bar wiring ───────────────────────────────────────────────────────

    #[test]
    fn grip_drives_the_window() {
        let (window, _probe) = window_with_probe();
        let bar = ScrollBar::new(TextureId(1), TextureId(2));
        bar.set_rect(Rect::new(0.0, 110.0, 100.0, 10.0));
        bar.set_grip_size(Vec2::new(20.0, 10.0));

        window.attach_scroll_bar(&bar);
        bar.set_grip_position(Vec2::new(0.5, 0.0));

        assert_eq!(window.window_position(), Vec2::new(0.5, 0.0));
    }

    #[test]
    fn resizing_the_viewport_rescales_the_scroll() {
        let (window, _probe) = window_with_probe();
        window.set_window_position(Vec2::new(1.0, 0.0));

        // A wider viewport leaves less overflow for the same position.
        window.set_rect(Rect::new(0.0, 0.0, 200.0, 100.0));

        let mut gfx = RecordingGfx::new();
        gfx.render(window.as_element());
        // Overflow is now 100: the probe lands at 250 - 100 = 150.
        assert_eq!(
            gfx.last_fill_rect(),
            Some(Rect::new(150.0, 10.0, 20.0, 20.0))
        );
    }
}
