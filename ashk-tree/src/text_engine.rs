//! Text Engine - glyph shaping into pixmaps.
//!
//! [`TextShaper`] is the capability the tree consumes: turn a run of text
//! into RGBA pixels at its natural size, optionally wrapped to a pixel
//! width. [`CosmicShaper`] does real shaping with cosmic-text and keeps an
//! LRU cache so unchanged runs are not re-rasterized every frame.
//! [`FixedCellShaper`] lays glyphs out on a monospace grid without touching
//! any font files.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, Wrap};
use image::Rgba;
use lru::LruCache;
use unicode_width::UnicodeWidthChar;

use crate::error::RenderError;
use crate::primitives::Color;
use crate::surface::Pixmap;

/// Font family specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Monospace,
    SansSerif,
    Serif,
    Named(String),
}

impl FontFamily {
    fn to_cosmic(&self) -> Family<'_> {
        match self {
            FontFamily::Monospace => Family::Monospace,
            FontFamily::SansSerif => Family::SansSerif,
            FontFamily::Serif => Family::Serif,
            FontFamily::Named(name) => Family::Name(name),
        }
    }
}

/// Font handle carried by text content.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    /// Font size in pixels.
    pub size: f32,
    /// Line height in pixels.
    pub line_height: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: FontFamily::Monospace,
            size: 30.0,
            line_height: 40.0,
        }
    }
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f32, line_height: f32) -> Self {
        Self {
            family,
            size,
            line_height,
        }
    }

    fn cache_hash<H: Hasher>(&self, hasher: &mut H) {
        self.family.hash(hasher);
        self.size.to_bits().hash(hasher);
        self.line_height.to_bits().hash(hasher);
    }
}

/// Shapes text runs into pixmaps.
pub trait TextShaper {
    /// Render `text` at its natural size. With `wrap_width`, lines break so
    /// that no line is wider than that many pixels (where possible).
    fn shape(
        &mut self,
        text: &str,
        font: &FontSpec,
        color: Color,
        wrap_width: Option<i32>,
    ) -> Result<Pixmap, RenderError>;
}

// =========================================================================
// CosmicShaper
// =========================================================================

/// Cache key for shaped runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text_hash: u64,
    style_hash: u64,
}

impl CacheKey {
    fn new(text: &str, font: &FontSpec, color: Color, wrap_width: Option<i32>) -> Self {
        let mut text_hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut text_hasher);

        let mut style_hasher = std::collections::hash_map::DefaultHasher::new();
        font.cache_hash(&mut style_hasher);
        color.hash(&mut style_hasher);
        wrap_width.hash(&mut style_hasher);

        Self {
            text_hash: text_hasher.finish(),
            style_hash: style_hasher.finish(),
        }
    }
}

/// cosmic-text backed shaper with an LRU cache of rasterized runs.
pub struct CosmicShaper {
    font_system: FontSystem,
    swash_cache: SwashCache,
    cache: LruCache<CacheKey, Pixmap>,
}

impl CosmicShaper {
    /// Create a shaper with the default cache size.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create a shaper caching at most `capacity` runs (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Load an additional font file into the font database.
    pub fn load_font_file(&mut self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        self.font_system.db_mut().load_font_file(path)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn shape_uncached(
        &mut self,
        text: &str,
        font: &FontSpec,
        color: Color,
        wrap_width: Option<i32>,
    ) -> Pixmap {
        let font_system = &mut self.font_system;
        let metrics = Metrics::new(font.size, font.line_height);
        let mut buffer = Buffer::new(font_system, metrics);

        match wrap_width {
            Some(width) => {
                buffer.set_wrap(font_system, Wrap::Word);
                buffer.set_size(font_system, Some(width.max(1) as f32), None);
            }
            None => {
                buffer.set_wrap(font_system, Wrap::None);
                buffer.set_size(font_system, Some(f32::MAX), None);
            }
        }

        let attrs = Attrs::new().family(font.family.to_cosmic());
        buffer.set_text(font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(font_system, false);

        let mut width = 0.0f32;
        let mut lines = 0usize;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            lines += 1;
        }

        let pixel_width = width.ceil().max(0.0) as u32;
        let pixel_height = (lines.max(1) as f32 * font.line_height).ceil() as u32;
        let mut pixmap = Pixmap::new(pixel_width, pixel_height);

        let ink = cosmic_text::Color::rgba(color.r, color.g, color.b, color.a);
        buffer.draw(font_system, &mut self.swash_cache, ink, |x, y, w, h, c| {
            if c.a() == 0 {
                return;
            }
            let px = Rgba([c.r(), c.g(), c.b(), c.a()]);
            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    let (tx, ty) = (x + dx, y + dy);
                    if tx < 0 || ty < 0 || tx as u32 >= pixel_width || ty as u32 >= pixel_height {
                        continue;
                    }
                    pixmap.put_pixel(tx as u32, ty as u32, px);
                }
            }
        });

        pixmap
    }
}

impl Default for CosmicShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper for CosmicShaper {
    fn shape(
        &mut self,
        text: &str,
        font: &FontSpec,
        color: Color,
        wrap_width: Option<i32>,
    ) -> Result<Pixmap, RenderError> {
        if !font.size.is_finite() || font.size <= 0.0 || font.line_height <= 0.0 {
            return Err(RenderError::Shaping(format!(
                "invalid font metrics {}px / {}px",
                font.size, font.line_height
            )));
        }

        let key = CacheKey::new(text, font, color, wrap_width);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let shaped = self.shape_uncached(text, font, color, wrap_width);
        self.cache.put(key, shaped.clone());
        Ok(shaped)
    }
}

// =========================================================================
// FixedCellShaper
// =========================================================================

/// Monospace grid shaper: every column is `cell_width` pixels, every line
/// `line_height` pixels, and each visible glyph is painted as a solid box.
///
/// Deterministic and font-free, for headless rendering and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedCellShaper {
    /// Overrides the width derived from the font size.
    pub cell_width: Option<i32>,
}

impl FixedCellShaper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_width(cell_width: i32) -> Self {
        Self {
            cell_width: Some(cell_width),
        }
    }

    /// Pixel width of one column for `font`.
    pub fn cell_width_for(&self, font: &FontSpec) -> i32 {
        self.cell_width
            .unwrap_or_else(|| (font.size * 0.6).round() as i32)
            .max(1)
    }

    /// Break `text` into lines of (column, char) cells.
    fn lay_out(&self, text: &str, columns_per_line: Option<usize>) -> Vec<Vec<(usize, char)>> {
        let mut lines = vec![Vec::new()];
        let mut column = 0usize;

        for ch in text.chars() {
            if ch == '\n' {
                lines.push(Vec::new());
                column = 0;
                continue;
            }
            let cw = columns_of(ch);
            if let Some(max) = columns_per_line {
                if column > 0 && column + cw > max {
                    lines.push(Vec::new());
                    column = 0;
                }
            }
            if let Some(line) = lines.last_mut() {
                line.push((column, ch));
            }
            column += cw;
        }

        lines
    }
}

/// Columns a tab spans on the fixed grid.
const TAB_COLUMNS: usize = 4;

fn columns_of(ch: char) -> usize {
    match ch {
        '\t' => TAB_COLUMNS,
        ch => UnicodeWidthChar::width(ch).unwrap_or(0),
    }
}

impl TextShaper for FixedCellShaper {
    fn shape(
        &mut self,
        text: &str,
        font: &FontSpec,
        color: Color,
        wrap_width: Option<i32>,
    ) -> Result<Pixmap, RenderError> {
        let cell = self.cell_width_for(font);
        let line_height = font.line_height.ceil().max(1.0) as i32;
        let columns_per_line = wrap_width.map(|w| (w / cell).max(1) as usize);
        let lines = self.lay_out(text, columns_per_line);

        let columns = lines
            .iter()
            .map(|line| {
                line.last()
                    .map(|&(col, ch)| col + columns_of(ch))
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0);

        let width = columns as u32 * cell as u32;
        let height = lines.len() as u32 * line_height as u32;
        let mut pixmap = Pixmap::new(width, height);
        let ink = Rgba(color.to_array());

        for (row, line) in lines.iter().enumerate() {
            for &(col, ch) in line {
                if ch.is_whitespace() {
                    continue;
                }
                let cw = columns_of(ch) as i32 * cell;
                let x0 = col as i32 * cell + 1;
                let y0 = row as i32 * line_height + line_height / 4;
                let x1 = (x0 + cw - 2).min(width as i32);
                let y1 = (y0 + line_height / 2).min(height as i32);
                for y in y0..y1 {
                    for x in x0..x1 {
                        pixmap.put_pixel(x as u32, y as u32, ink);
                    }
                }
            }
        }

        Ok(pixmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> FontSpec {
        FontSpec::new(FontFamily::Monospace, 30.0, 40.0)
    }

    #[test]
    fn fixed_cell_natural_size() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper.shape("abc", &font(), Color::WHITE, None).unwrap();
        assert_eq!(pixmap.dimensions(), (30, 40));
    }

    #[test]
    fn fixed_cell_empty_text_is_one_empty_line() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper.shape("", &font(), Color::WHITE, None).unwrap();
        assert_eq!(pixmap.dimensions(), (0, 40));
    }

    #[test]
    fn fixed_cell_wraps_at_pixel_width() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper
            .shape("abcdefg", &font(), Color::WHITE, Some(35))
            .unwrap();
        // 3 columns per line -> "abc", "def", "g"
        assert_eq!(pixmap.dimensions(), (30, 120));
    }

    #[test]
    fn fixed_cell_counts_wide_chars_twice() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper.shape("a界", &font(), Color::WHITE, None).unwrap();
        assert_eq!(pixmap.width(), 30);
    }

    #[test]
    fn fixed_cell_tab_spans_four_columns() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper.shape("\t", &font(), Color::WHITE, None).unwrap();
        assert_eq!(pixmap.width(), 40);
        assert!(pixmap.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn fixed_cell_paints_ink() {
        let mut shaper = FixedCellShaper::with_cell_width(10);
        let pixmap = shaper.shape("x", &font(), Color::WHITE, None).unwrap();
        assert_eq!(*pixmap.get_pixel(5, 20), Rgba([255, 255, 255, 255]));
        assert_eq!(*pixmap.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn cache_key_distinguishes_wrap_width() {
        let a = CacheKey::new("hi", &font(), Color::WHITE, None);
        let b = CacheKey::new("hi", &font(), Color::WHITE, Some(10));
        assert_ne!(a, b);
        assert_eq!(a, CacheKey::new("hi", &font(), Color::WHITE, None));
    }

    #[test]
    fn cosmic_rejects_invalid_metrics() {
        let mut shaper = CosmicShaper::with_capacity(4);
        let bad = FontSpec::new(FontFamily::Monospace, 0.0, 10.0);
        assert!(shaper.shape("x", &bad, Color::WHITE, None).is_err());
        assert_eq!(shaper.cache_len(), 0);
    }
}
