//! Rasterizer: paint commands to an RGBA bitmap.
//!
//! Glyphs are drawn as solid blocks inside an 8x8 cell, which is enough to
//! make text visible and layout differences show up in bitmap digests.

use super::paint::PaintCommand;
use super::GLYPH_ADVANCE;
use crate::Bitmap;

pub const BACKGROUND: [u8; 4] = [255, 255, 255, 255];
pub const INK: [u8; 4] = [0, 0, 0, 255];

const GLYPH_WIDTH: u32 = 6;
const GLYPH_HEIGHT: u32 = 7;

struct Canvas {
    bitmap: Bitmap,
}

impl Canvas {
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, rgba: [u8; 4]) {
        let w = self.bitmap.width as i64;
        let h = self.bitmap.height as i64;
        let x0 = (x as i64).clamp(0, w);
        let y0 = (y as i64).clamp(0, h);
        let x1 = (x as i64 + width as i64).clamp(0, w);
        let y1 = (y as i64 + height as i64).clamp(0, h);
        for py in y0..y1 {
            for px in x0..x1 {
                let i = ((py * w + px) * 4) as usize;
                self.bitmap.pixels[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, max_columns: usize) {
        let advance = (GLYPH_ADVANCE * scale) as i32;
        for (row, line) in text.lines().enumerate() {
            for (col, ch) in line.chars().take(max_columns).enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                self.fill_rect(
                    x + col as i32 * advance,
                    y + row as i32 * advance,
                    GLYPH_WIDTH * scale,
                    GLYPH_HEIGHT * scale,
                    INK,
                );
            }
        }
    }
}

/// Rasterize `commands` onto a white `width` x `height` canvas.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand]) -> Bitmap {
    let mut canvas = Canvas {
        bitmap: Bitmap::filled(width, height, BACKGROUND),
    };
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect {
                x,
                y,
                width,
                height,
                rgba,
            } => canvas.fill_rect(*x, *y, *width, *height, *rgba),
            PaintCommand::Text {
                x,
                y,
                text,
                scale,
                max_columns,
            } => canvas.draw_text(*x, *y, text, *scale, *max_columns),
        }
    }
    canvas.bitmap
}
