//! Minimal raster drawing on top of [`image::RgbImage`].
//!
//! Coordinates are signed so callers can draw shapes that extend past the
//! edges; anything outside the image is clipped.

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{ImageFormat, ImageResult, Rgb, RgbImage};

/// Glyph cell size in pixels at scale 1.
pub(crate) const GLYPH: i64 = 8;

pub(crate) const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub(crate) const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub(crate) const GRID: Rgb<u8> = Rgb([210, 210, 210]);
pub(crate) const SERIES: Rgb<u8> = Rgb([31, 119, 180]);

pub(crate) struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    pub(crate) fn set(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x < 0 || y < 0 || x >= i64::from(self.image.width()) || y >= i64::from(self.image.height()) {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, color);
    }

    /// Fills the rectangle spanning both corners, inclusive.
    pub(crate) fn fill_rect(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));
        for y in top..=bottom {
            for x in left..=right {
                self.set(x, y, color);
            }
        }
    }

    /// Bresenham line, stamped with a square brush of `thickness` pixels.
    pub(crate) fn line(&mut self, from: (i64, i64), to: (i64, i64), thickness: i64, color: Rgb<u8>) {
        let (mut x, mut y) = from;
        let (x1, y1) = to;
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let half = thickness.max(1) / 2;

        loop {
            self.fill_rect(x - half, y - half, x + half, y + half, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub(crate) fn dashed_hline(&mut self, y: i64, x0: i64, x1: i64, color: Rgb<u8>) {
        const DASH: i64 = 8;
        const GAP: i64 = 6;
        let mut x = x0.min(x1);
        let end = x0.max(x1);
        while x <= end {
            for dx in 0..DASH {
                if x + dx > end {
                    break;
                }
                self.set(x + dx, y, color);
            }
            x += DASH + GAP;
        }
    }

    pub(crate) fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>) {
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    self.set(cx + x, cy + y, color);
                }
            }
        }
    }

    /// Draws `text` left to right with its top-left corner at (`x`, `y`).
    /// Each glyph pixel becomes a `scale` x `scale` square.
    pub(crate) fn text(&mut self, x: i64, y: i64, text: &str, scale: i64, color: Rgb<u8>) {
        for (i, ch) in text.chars().enumerate() {
            let origin = x + i as i64 * GLYPH * scale;
            for_each_glyph_pixel(ch, |col, row| {
                let (px, py) = (origin + col * scale, y + row * scale);
                self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
            });
        }
    }

    /// Draws `text` bottom to top, turned a quarter anticlockwise. (`x`, `y`)
    /// is the bottom-left corner of the turned text.
    pub(crate) fn text_vertical(&mut self, x: i64, y: i64, text: &str, scale: i64, color: Rgb<u8>) {
        for (i, ch) in text.chars().enumerate() {
            let origin = y - i as i64 * GLYPH * scale;
            for_each_glyph_pixel(ch, |col, row| {
                let (px, py) = (x + row * scale, origin - (col + 1) * scale);
                self.fill_rect(px, py, px + scale - 1, py + scale - 1, color);
            });
        }
    }

    pub(crate) fn save(&self, path: &Path) -> ImageResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub(crate) fn text_width(text: &str, scale: i64) -> i64 {
    text.chars().count() as i64 * GLYPH * scale
}

/// Calls `f(col, row)` for every set pixel of `ch`. Characters missing from
/// the font are drawn as `?`.
fn for_each_glyph_pixel(ch: char, mut f: impl FnMut(i64, i64)) {
    let rows = BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8]);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..8u8 {
            // Bit 0 is the leftmost pixel.
            if bits & (1 << col) != 0 {
                f(i64::from(col), row as i64);
            }
        }
    }
}
