//! Single-line text field with IME composition, selection, and clipboard
//! support.
//!
//! The field keeps two strings: the committed text and an in-progress IME
//! composition anchored at the caret. All indices are byte offsets that
//! stay on `char` boundaries by construction. The field renders into a
//! backing target rebuilt lazily when state affecting layout changes;
//! typing mode gates keyboard input and the caret blink, while the
//! application stays in charge of IME activation on the window.

use std::sync::Arc;

use parking_lot::Mutex;

use pergola_core::coords::{ColorRgba, Rect, Vec2};
use pergola_core::input::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState,
};
use pergola_core::render::{Flip, TextImage, TextureId};
use pergola_core::text::{FontId, TextShaper};

use crate::clipboard::Clipboard;
use crate::element::{Element, ElementBase, EventKind};
use crate::painter::Painter;

const BLINK_CYCLE_MS: u32 = 1500;
const BLINK_VISIBLE_MS: u32 = 750;

/// Color slots of a [`TextField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldColor {
    CommitText,
    CompositionText,
    CompositionUnderline,
    Cursor,
    SelectionBox,
    PromptText,
    Background,
}

impl FieldColor {
    const COUNT: usize = FieldColor::Background as usize + 1;
}

fn default_colors() -> [ColorRgba; FieldColor::COUNT] {
    let mut colors = [ColorRgba::white(); FieldColor::COUNT];
    colors[FieldColor::SelectionBox as usize] = ColorRgba::from_rgba8(0, 120, 215, 255);
    colors[FieldColor::PromptText as usize] = ColorRgba::from_rgba8(192, 192, 192, 192);
    colors[FieldColor::Background as usize] = ColorRgba::transparent();
    colors
}

struct FieldState {
    commit: String,
    /// IME preedit text, empty when not composing.
    composition: String,
    /// Byte index in `commit` where the composition folds in.
    composition_anchor: usize,
    /// Caret byte index inside `composition`.
    composition_cursor: usize,
    /// Caret byte index in `commit`.
    cursor: usize,
    /// Selected byte range in `commit`, empty when the ends match.
    selection: (usize, usize),
    selecting: bool,
    select_anchor: usize,
    typing: bool,
    blink_ms: u32,
    /// Horizontal offset applied to the text run so the caret stays
    /// visible.
    scroll_x: f32,
    rebuild: bool,
}

#[derive(Clone)]
struct FieldLook {
    font: FontId,
    px: f32,
    colors: [ColorRgba; FieldColor::COUNT],
    line_width: f32,
    underline_dash: f32,
    underline_gap: f32,
    prompt: String,
}

struct FieldVisual {
    target: Option<TextureId>,
    left: Option<(TextureId, Vec2)>,
    composition: Option<(TextureId, Vec2)>,
    right: Option<(TextureId, Vec2)>,
}

pub struct TextField {
    base: ElementBase,
    clipboard: Arc<dyn Clipboard>,
    state: Mutex<FieldState>,
    look: Mutex<FieldLook>,
    visual: Mutex<FieldVisual>,
}

/// Largest index `<= index` on a char boundary of `s`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Walks `delta` whole characters from `from`, clamped to the string.
fn seek_chars(s: &str, from: usize, delta: isize) -> usize {
    let mut index = floor_char_boundary(s, from);
    let mut remaining = delta;
    while remaining > 0 && index < s.len() {
        index += 1;
        while !s.is_char_boundary(index) {
            index += 1;
        }
        remaining -= 1;
    }
    while remaining < 0 && index > 0 {
        index -= 1;
        while !s.is_char_boundary(index) {
            index -= 1;
        }
        remaining += 1;
    }
    index
}

/// Start of the first character whose trailing edge reaches `x`, or the
/// full length when the run ends short of it.
fn index_at(text: &str, x: f32, font: FontId, px: f32, shaper: &dyn TextShaper) -> usize {
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        if shaper.measure(&text[..end], font, px).x >= x {
            return start;
        }
    }
    text.len()
}

/// Removes the selected range, leaving the caret at its start.
fn delete_selection(state: &mut FieldState) {
    let (begin, end) = state.selection;
    if end > begin {
        state.commit.replace_range(begin..end, "");
        state.cursor = begin;
        state.selection = (0, 0);
    }
}

impl TextField {
    pub fn new(font: FontId, px: f32, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            base: ElementBase::new(),
            clipboard,
            state: Mutex::new(FieldState {
                commit: String::new(),
                composition: String::new(),
                composition_anchor: 0,
                composition_cursor: 0,
                cursor: 0,
                selection: (0, 0),
                selecting: false,
                select_anchor: 0,
                typing: false,
                blink_ms: 0,
                scroll_x: 0.0,
                rebuild: true,
            }),
            look: Mutex::new(FieldLook {
                font,
                px,
                colors: default_colors(),
                line_width: 5.0,
                underline_dash: 10.0,
                underline_gap: 10.0,
                prompt: String::new(),
            }),
            visual: Mutex::new(FieldVisual {
                target: None,
                left: None,
                composition: None,
                right: None,
            }),
        }
    }

    pub fn commit_string(&self) -> String {
        self.state.lock().commit.clone()
    }

    /// Replaces the committed text. Ignored while the field is typing;
    /// stale caret and selection indices are dropped.
    pub fn set_commit_string(&self, text: &str) {
        let mut state = self.state.lock();
        if state.typing {
            return;
        }
        state.commit = text.to_string();
        state.cursor = floor_char_boundary(&state.commit, state.cursor);
        state.selection = (0, 0);
        state.rebuild = true;
    }

    /// Caret byte index in the committed text.
    pub fn cursor_index(&self) -> usize {
        self.state.lock().cursor
    }

    /// Selected byte range in the committed text, empty when the ends
    /// match.
    pub fn selection(&self) -> (usize, usize) {
        self.state.lock().selection
    }

    pub fn is_typing(&self) -> bool {
        self.state.lock().typing
    }

    pub fn prompt(&self) -> String {
        self.look.lock().prompt.clone()
    }

    /// Placeholder drawn while the field is idle and empty.
    pub fn set_prompt(&self, prompt: &str) {
        self.look.lock().prompt = prompt.to_string();
        self.state.lock().rebuild = true;
    }

    pub fn color(&self, slot: FieldColor) -> ColorRgba {
        self.look.lock().colors[slot as usize]
    }

    pub fn set_color(&self, slot: FieldColor, color: ColorRgba) {
        self.look.lock().colors[slot as usize] = color;
        self.state.lock().rebuild = true;
    }

    pub fn line_width(&self) -> f32 {
        self.look.lock().line_width
    }

    /// Width of the caret and thickness of the composition underline.
    pub fn set_line_width(&self, width: f32) {
        self.look.lock().line_width = width;
        self.state.lock().rebuild = true;
    }

    pub fn underline_lengths(&self) -> (f32, f32) {
        let look = self.look.lock();
        (look.underline_dash, look.underline_gap)
    }

    /// Dash and gap lengths of the composition underline. A non-positive
    /// gap draws it solid; a non-positive dash with a positive gap draws
    /// nothing.
    pub fn set_underline_lengths(&self, dash: f32, gap: f32) {
        {
            let mut look = self.look.lock();
            look.underline_dash = dash;
            look.underline_gap = gap;
        }
        self.state.lock().rebuild = true;
    }

    /// Enters typing mode and restarts the caret blink. The application
    /// still owns IME activation on the window.
    pub fn start_typing(&self) {
        let mut state = self.state.lock();
        state.typing = true;
        state.blink_ms = 0;
        state.rebuild = true;
    }

    /// Leaves typing mode. An open composition folds into the committed
    /// text at its anchor and the selection clears.
    pub fn stop_typing(&self) {
        let mut state = self.state.lock();
        state.typing = false;
        state.selection = (0, 0);
        if !state.composition.is_empty() {
            let anchor = state.composition_anchor;
            let composition = std::mem::take(&mut state.composition);
            state.commit.insert_str(anchor, &composition);
            state.composition_cursor = 0;
            // The fold shifts bytes past the anchor; a caret clicked there
            // mid-composition could now sit inside a character.
            state.cursor = floor_char_boundary(&state.commit, state.cursor);
        }
        state.rebuild = true;
    }

    /// Byte index of the caret slot under `x` in the field's text frame.
    pub fn index_from_position(&self, x: f32, shaper: &dyn TextShaper) -> usize {
        let commit = self.commit_string();
        let (font, px) = {
            let look = self.look.lock();
            (look.font, look.px)
        };
        index_at(&commit, x, font, px, shaper)
    }

    fn caret_index_at(&self, point: Vec2, shaper: &dyn TextShaper) -> usize {
        let rect = self.rect();
        let local = (point - rect.origin).rotated_about(-self.angle(), Vec2::ZERO);
        self.index_from_position(local.x, shaper)
    }

    fn pointer_pass(&self, event: &InputEvent, shaper: &dyn TextShaper) {
        let focused = self.has_focus();
        match event {
            InputEvent::PointerButton(b)
                if b.button == MouseButton::Left && b.state == MouseButtonState::Pressed =>
            {
                if focused {
                    let index = self.caret_index_at(Vec2::new(b.x, b.y), shaper);
                    let mut state = self.state.lock();
                    state.selecting = true;
                    state.select_anchor = index;
                    state.selection = (0, 0);
                    state.cursor = index;
                    state.rebuild = true;
                } else if self.is_typing() {
                    self.stop_typing();
                }
            }
            InputEvent::PointerMoved(m) if focused => {
                if self.state.lock().selecting {
                    let index = self.caret_index_at(Vec2::new(m.x, m.y), shaper);
                    let mut state = self.state.lock();
                    let anchor = state.select_anchor;
                    state.selection = (anchor.min(index), anchor.max(index));
                    state.cursor = index;
                    state.rebuild = true;
                }
            }
            InputEvent::PointerButton(b)
                if b.button == MouseButton::Left
                    && b.state == MouseButtonState::Released
                    && focused =>
            {
                self.state.lock().selecting = false;
                self.start_typing();
            }
            _ => {}
        }
    }

    fn typing_pass(&self, event: &InputEvent) {
        if !self.is_typing() {
            return;
        }
        match event {
            InputEvent::Text(t) => self.insert_commit(&t.text),
            InputEvent::Composition(c) => self.update_composition(&c.text, c.cursor),
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                modifiers,
                ..
            } => {
                // Keys act on the committed text only between compositions.
                if self.state.lock().composition.is_empty() {
                    self.handle_key(*key, *modifiers);
                }
            }
            _ => {}
        }
    }

    /// Commits `text` at the caret, replacing any selection. The one edit
    /// that fires [`EventKind::ValueChanged`].
    fn insert_commit(&self, text: &str) {
        {
            let mut state = self.state.lock();
            delete_selection(&mut state);
            let cursor = state.cursor;
            state.commit.insert_str(cursor, text);
            state.cursor += text.len();
            state.composition_anchor = 0;
            state.blink_ms = 0;
            state.rebuild = true;
        }
        self.base
            .invoke(self.as_element(), EventKind::ValueChanged, None);
    }

    fn update_composition(&self, text: &str, cursor_hint: Option<usize>) {
        let mut state = self.state.lock();
        if state.composition.is_empty() {
            // A fresh composition replaces the selection and anchors at
            // the caret.
            delete_selection(&mut state);
            state.composition_anchor = state.cursor;
        }
        state.composition = text.to_string();
        let hint = cursor_hint.unwrap_or(state.composition.len());
        state.composition_cursor = floor_char_boundary(&state.composition, hint);
        state.blink_ms = 0;
        state.rebuild = true;
    }

    fn handle_key(&self, key: Key, modifiers: Modifiers) {
        match key {
            Key::Backspace => self.erase_backward(),
            Key::Delete => self.erase_forward(),
            Key::ArrowLeft => self.move_caret(-1, modifiers.shift),
            Key::ArrowRight => self.move_caret(1, modifiers.shift),
            Key::X if modifiers.ctrl => self.cut(),
            Key::C if modifiers.ctrl => self.copy(),
            Key::V if modifiers.ctrl => self.paste(),
            _ => {}
        }
    }

    fn erase_backward(&self) {
        let mut state = self.state.lock();
        if state.cursor == 0 {
            return;
        }
        let (begin, end) = state.selection;
        if end > begin {
            delete_selection(&mut state);
        } else {
            let target = seek_chars(&state.commit, state.cursor, -1);
            let cursor = state.cursor;
            state.commit.replace_range(target..cursor, "");
            state.cursor = target;
        }
        state.blink_ms = 0;
        state.rebuild = true;
    }

    fn erase_forward(&self) {
        let mut state = self.state.lock();
        if state.cursor >= state.commit.len() {
            return;
        }
        let (begin, end) = state.selection;
        if end > begin {
            delete_selection(&mut state);
        } else {
            let cursor = state.cursor;
            let target = seek_chars(&state.commit, cursor, 1);
            state.commit.replace_range(cursor..target, "");
        }
        state.blink_ms = 0;
        state.rebuild = true;
    }

    fn move_caret(&self, delta: isize, extend: bool) {
        let mut state = self.state.lock();
        let cursor = state.cursor;
        let target = seek_chars(&state.commit, cursor, delta);
        if extend {
            let (begin, end) = state.selection;
            let mut next = if end > begin {
                // Move whichever end sits at the caret.
                if cursor == begin {
                    (target, end)
                } else {
                    (begin, target)
                }
            } else if delta < 0 {
                (target, cursor)
            } else {
                (cursor, target)
            };
            if next.0 > next.1 {
                std::mem::swap(&mut next.0, &mut next.1);
            }
            state.selection = next;
        } else {
            state.selection = (0, 0);
        }
        state.cursor = target;
        state.blink_ms = 0;
        state.rebuild = true;
    }

    fn cut(&self) {
        let selected = {
            let mut state = self.state.lock();
            let (begin, end) = state.selection;
            if end <= begin {
                return;
            }
            let selected = state.commit[begin..end].to_string();
            delete_selection(&mut state);
            state.rebuild = true;
            selected
        };
        self.clipboard.set_text(&selected);
    }

    fn copy(&self) {
        let selected = {
            let state = self.state.lock();
            let (begin, end) = state.selection;
            if end <= begin {
                return;
            }
            state.commit[begin..end].to_string()
        };
        self.clipboard.set_text(&selected);
    }

    fn paste(&self) {
        let Some(text) = self.clipboard.get_text() else {
            return;
        };
        let mut state = self.state.lock();
        delete_selection(&mut state);
        let cursor = state.cursor;
        state.commit.insert_str(cursor, &text);
        state.cursor += text.len();
        state.rebuild = true;
    }

    /// Re-measures the layout, re-uploads the text runs, and composites
    /// the backing target.
    fn rebuild_surfaces(&self, painter: &mut Painter<'_>) {
        let look = self.look.lock().clone();
        let (commit, composition, anchor, comp_cursor, cursor, selection, typing, blink, scroll_in) = {
            let state = self.state.lock();
            (
                state.commit.clone(),
                state.composition.clone(),
                state.composition_anchor,
                state.composition_cursor,
                state.cursor,
                state.selection,
                state.typing,
                state.blink_ms,
                state.scroll_x,
            )
        };
        let field = self.rect().size;
        let font = look.font;
        let px = look.px;
        let shaper = painter.fonts;
        let color = |slot: FieldColor| look.colors[slot as usize];

        // Three runs: committed text left of the composition, the
        // composition, and the committed tail right of it. The prompt
        // stands in when the field is idle and empty.
        let composing = !composition.is_empty();
        let (left_text, left_color) = if composing {
            (commit[..anchor].to_string(), FieldColor::CommitText)
        } else if !typing && commit.is_empty() {
            (look.prompt.clone(), FieldColor::PromptText)
        } else {
            (commit.clone(), FieldColor::CommitText)
        };
        let right_text = if composing {
            commit[anchor..].to_string()
        } else {
            String::new()
        };

        let left_size = shaper.measure(&left_text, font, px);
        let comp_size = shaper.measure(&composition, font, px);
        let right_size = shaper.measure(&right_text, font, px);

        // Caret x relative to the unscrolled run, and the caret height.
        let caret = if composing {
            let prefix = shaper.measure(&composition[..comp_cursor], font, px);
            Vec2::new(left_size.x + prefix.x, prefix.y)
        } else {
            shaper.measure(&commit[..cursor], font, px)
        };

        // Scroll keeps the caret inside the field and the run flush when
        // it overflows.
        let total = left_size.x + comp_size.x + right_size.x;
        let mut scroll = scroll_in;
        let caret_x = caret.x + scroll + look.line_width / 2.0;
        let right_edge = scroll + total;
        if total < field.x {
            scroll = 0.0;
        } else if caret_x > field.x {
            scroll -= caret_x - field.x;
        } else if caret_x < 0.0 {
            scroll -= caret_x;
        } else if right_edge < field.x {
            scroll += field.x - right_edge;
        }

        let left_x = scroll;
        let comp_x = left_x + left_size.x;
        let right_x = comp_x + comp_size.x;
        let caret_rect = Rect::new(
            caret.x + scroll + look.line_width / 2.0,
            0.0,
            look.line_width,
            caret.y,
        );
        let underline = Rect::new(comp_x, comp_size.y, comp_size.x, look.line_width);
        let selection_rect = {
            let prefix = shaper.measure(&commit[..selection.0], font, px).x;
            let size = shaper.measure(&commit[selection.0..selection.1], font, px);
            Rect::new(left_x + prefix, 0.0, size.x, size.y)
        };

        {
            let mut visual = self.visual.lock();
            for texture in [
                visual.target.take(),
                visual.left.take().map(|(t, _)| t),
                visual.composition.take().map(|(t, _)| t),
                visual.right.take().map(|(t, _)| t),
            ]
            .into_iter()
            .flatten()
            {
                painter.gfx.destroy_texture(texture);
            }
        }

        let left_img = shaper.rasterize(&left_text, font, px, color(left_color));
        let comp_img = shaper.rasterize(&composition, font, px, color(FieldColor::CompositionText));
        let right_img = shaper.rasterize(&right_text, font, px, color(FieldColor::CommitText));

        let mut upload = |image: Option<TextImage>| {
            let image = image?;
            let size = Vec2::new(image.width as f32, image.height as f32);
            painter.gfx.upload_text(&image).map(|id| (id, size))
        };
        let left = upload(left_img);
        let comp = upload(comp_img);
        let right = upload(right_img);

        let target = if field.x > 0.0 && field.y > 0.0 {
            painter
                .gfx
                .create_target(field.x.round() as u32, field.y.round() as u32)
        } else {
            None
        };

        if let Some(target) = target {
            painter.gfx.push_target(target);
            painter.gfx.clear(color(FieldColor::Background));

            if selection.1 > selection.0 {
                painter
                    .gfx
                    .fill_rect(selection_rect, color(FieldColor::SelectionBox));
            }

            if composing {
                let dash = look.underline_dash;
                let gap = look.underline_gap;
                if gap <= 0.0 {
                    painter
                        .gfx
                        .fill_rect(underline, color(FieldColor::CompositionUnderline));
                } else if dash > 0.0 {
                    let end = underline.origin.x + underline.size.x;
                    let mut x = underline.origin.x;
                    while x < end {
                        let w = dash.min(end - x);
                        painter.gfx.fill_rect(
                            Rect::new(x, underline.origin.y, w, underline.size.y),
                            color(FieldColor::CompositionUnderline),
                        );
                        x += dash + gap;
                    }
                }
            }

            for (run, x) in [(&left, left_x), (&right, right_x), (&comp, comp_x)] {
                if let Some((texture, size)) = run {
                    painter.gfx.draw_texture(
                        *texture,
                        None,
                        Rect::from_origin_size(Vec2::new(x, 0.0), *size),
                        0.0,
                        Flip::None,
                    );
                }
            }

            if typing && blink < BLINK_VISIBLE_MS {
                painter.gfx.fill_rect(caret_rect, color(FieldColor::Cursor));
            }

            painter.gfx.pop_target();
        }

        {
            let mut visual = self.visual.lock();
            visual.target = target;
            visual.left = left;
            visual.composition = comp;
            visual.right = right;
        }
        {
            let mut state = self.state.lock();
            state.scroll_x = scroll;
            state.rebuild = false;
        }
    }
}

impl Element for TextField {
    fn base(&self) -> &ElementBase {
        &self.base
    }

    fn as_element(&self) -> &dyn Element {
        self
    }

    fn render(&self, painter: &mut Painter<'_>) {
        if self.state.lock().rebuild {
            self.rebuild_surfaces(painter);
        }
        let target = self.visual.lock().target;
        if let Some(target) = target {
            painter
                .gfx
                .draw_texture(target, None, self.rect(), self.angle(), self.flip());
        }
    }

    fn process_input(&self, events: &[InputEvent], painter: &mut Painter<'_>) {
        self.base.dispatch_batch(self.as_element(), events);
        for event in events {
            self.pointer_pass(event, painter.fonts);
            self.typing_pass(event);
        }
    }

    fn reset_input(&self) {
        let mut state = self.state.lock();
        state.commit.clear();
        state.composition.clear();
        state.composition_anchor = 0;
        state.composition_cursor = 0;
        state.cursor = 0;
        state.selection = (0, 0);
        state.selecting = false;
        state.scroll_x = 0.0;
        state.rebuild = true;
    }

    fn advance_time(&self, delta_ms: u32) {
        let mut state = self.state.lock();
        let next = (state.blink_ms + delta_ms) % BLINK_CYCLE_MS;
        if (state.blink_ms < BLINK_VISIBLE_MS) != (next < BLINK_VISIBLE_MS) {
            state.rebuild = true;
        }
        state.blink_ms = next;
    }

    fn set_rect(&self, rect: Rect) {
        self.base.store_rect(rect);
        self.state.lock().rebuild = true;
    }
}
