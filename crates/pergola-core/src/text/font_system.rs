use std::fmt;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::coords::{ColorRgba, Vec2};
use crate::render::TextImage;

use super::TextShaper;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Handle to a loaded font, minted by the [`TextShaper`] implementation
/// that owns the font data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub usize);

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. The system is owned by the
/// application and lent to widgets each frame through the
/// [`TextShaper`] seam.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    ///
    /// Returns the `FontId` that identifies the font in later calls.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("font {} loaded", id.0);
        Ok(id)
    }

    fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    fn laid_out(&self, text: &str, font: &fontdue::Font, px: f32) -> Layout<()> {
        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(std::slice::from_ref(font), &TextStyle::new(text, px, 0));
        layout
    }
}

impl TextShaper for FontSystem {
    fn measure(&self, text: &str, font: FontId, px: f32) -> Vec2 {
        let Some(font) = self.get(font) else {
            return Vec2::new(0.0, px * 1.2);
        };

        let layout = self.laid_out(text, font, px);
        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return Vec2::new(0.0, px * 1.2);
        }

        // Width is the pen position after each glyph (x - xmin + advance),
        // not the bitmap right edge. Prefix-width sums computed this way
        // stay monotonic, which caret positioning depends on.
        let w = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, px);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = glyphs
            .iter()
            .map(|g| g.y + g.height as f32)
            .fold(px, f32::max);
        Vec2::new(w, h)
    }

    fn rasterize(&self, text: &str, font: FontId, px: f32, color: ColorRgba) -> Option<TextImage> {
        let font = self.get(font)?;

        let layout = self.laid_out(text, font, px);
        let glyphs = layout.glyphs();

        let width = glyphs
            .iter()
            .map(|g| (g.x + g.width as f32).ceil() as i64)
            .max()
            .unwrap_or(0);
        let height = glyphs
            .iter()
            .map(|g| (g.y + g.height as f32).ceil() as i64)
            .max()
            .unwrap_or(0);
        if width <= 0 || height <= 0 {
            return None;
        }
        let (width, height) = (width as usize, height as usize);

        let r = (color.r * 255.0).round() as u8;
        let g8 = (color.g * 255.0).round() as u8;
        let b = (color.b * 255.0).round() as u8;

        let mut pixels = vec![0u8; width * height * 4];
        for glyph in glyphs {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, coverage) = font.rasterize_config(glyph.key);
            let left = glyph.x.round() as i64;
            let top = glyph.y.round() as i64;

            for row in 0..glyph.height {
                let y = top + row as i64;
                if y < 0 || y >= height as i64 {
                    continue;
                }
                for col in 0..glyph.width {
                    let x = left + col as i64;
                    if x < 0 || x >= width as i64 {
                        continue;
                    }
                    let cov = coverage[row * glyph.width + col];
                    if cov == 0 {
                        continue;
                    }
                    let a = (cov as f32 * color.a).round() as u8;
                    let at = (y as usize * width + x as usize) * 4;
                    // Overlapping glyphs keep the stronger coverage.
                    if pixels[at + 3] < a {
                        pixels[at] = r;
                        pixels[at + 1] = g8;
                        pixels[at + 2] = b;
                        pixels[at + 3] = a;
                    }
                }
            }
        }

        Some(TextImage {
            width: width as u32,
            height: height as u32,
            pixels,
        })
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}
