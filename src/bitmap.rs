//! Captured bitmaps

use crate::Result;
use sha2::{Digest, Sha256};
use url::Url;

/// An RGBA8 frame captured from a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA pixels, `width * height * 4` bytes
    pub pixels: Vec<u8>,
    /// URL the surface had loaded when the frame was captured
    pub url: Option<Url>,
}

impl Bitmap {
    /// A bitmap filled with a single colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let len = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(len * 4);
        for _ in 0..len {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
            url: None,
        }
    }

    pub fn with_url(mut self, url: Option<Url>) -> Self {
        self.url = url;
        self
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Nearest-neighbour downscale. Factors of 1 or more (and NaN) return
    /// the bitmap unchanged; factors that would collapse a dimension to zero
    /// keep at least one pixel.
    pub fn scaled(&self, factor: f32) -> Bitmap {
        if factor.is_nan() || factor >= 1.0 || self.width == 0 || self.height == 0 {
            return self.clone();
        }
        let factor = factor.max(f32::MIN_POSITIVE);
        let width = ((self.width as f32 * factor).round() as u32).max(1);
        let height = ((self.height as f32 * factor).round() as u32).max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            let sy = ((y as f32 / factor) as u32).min(self.height - 1);
            for x in 0..width {
                let sx = ((x as f32 / factor) as u32).min(self.width - 1);
                let i = (sy as usize * self.width as usize + sx as usize) * 4;
                pixels.extend_from_slice(&self.pixels[i..i + 4]);
            }
        }
        Bitmap {
            width,
            height,
            pixels,
            url: self.url.clone(),
        }
    }

    /// Encode as PNG bytes
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(out)
    }

    /// Hex SHA-256 over dimensions and pixels; the source URL is not included.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_be_bytes());
        hasher.update(self.height.to_be_bytes());
        hasher.update(&self.pixels);
        hex::encode(hasher.finalize())
    }
}
