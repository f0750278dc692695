use scrawl_lang::{Canvas, Color};

use crate::error::SurfaceUnavailable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    #[default]
    Rgba8888,
    /// RGBA layout, alpha ignored and stored opaque.
    Rgbx8888,
    /// 16-bit little-endian 5-6-5.
    Rgb565,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8888 | Self::Rgbx8888 => 4,
            Self::Rgb565 => 2,
        }
    }

    fn encode(self, rgba: [u8; 4], out: &mut [u8]) {
        match self {
            Self::Rgba8888 => out.copy_from_slice(&rgba),
            Self::Rgbx8888 => out.copy_from_slice(&[rgba[0], rgba[1], rgba[2], 255]),
            Self::Rgb565 => {
                let v = (u16::from(rgba[0] >> 3) << 11)
                    | (u16::from(rgba[1] >> 2) << 5)
                    | u16::from(rgba[2] >> 3);
                out.copy_from_slice(&v.to_le_bytes());
            }
        }
    }

    fn decode(self, px: &[u8]) -> [u8; 4] {
        match self {
            Self::Rgba8888 => [px[0], px[1], px[2], px[3]],
            Self::Rgbx8888 => [px[0], px[1], px[2], 255],
            Self::Rgb565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1f) as u8;
                let g = ((v >> 5) & 0x3f) as u8;
                let b = (v & 0x1f) as u8;
                [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255]
            }
        }
    }
}

// ─── Pixel buffer ─────────────────────────────────────────────────────────────

/// CPU-side pixel storage, row-major, top-left origin. Every draw call is
/// clipped to the buffer bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// New buffer, all bytes zero (transparent black for RGBA).
    pub fn new(width: i32, height: i32, format: PixelFormat) -> Result<Self, SurfaceUnavailable> {
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(SurfaceUnavailable);
        };
        if width == 0 || height == 0 {
            return Err(SurfaceUnavailable);
        }
        let stride = (width as usize).checked_mul(format.bytes_per_pixel()).ok_or(SurfaceUnavailable)?;
        let len = stride.checked_mul(height as usize).ok_or(SurfaceUnavailable)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| SurfaceUnavailable)?;
        pixels.resize(len, 0);
        Ok(Self { width, height, stride, format, pixels })
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn stride(&self) -> usize { self.stride }
    pub fn format(&self) -> PixelFormat { self.format }

    /// Raw bytes in `format()` layout.
    pub fn as_bytes(&self) -> &[u8] { &self.pixels }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = y as usize * self.stride + x as usize * bpp;
        Some(self.format.decode(&self.pixels[idx..idx + bpp]))
    }

    /// Decode into tightly packed RGBA8, whatever the storage format.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let bpp = self.format.bytes_per_pixel();
        self.pixels.chunks_exact(bpp).flat_map(|px| self.format.decode(px)).collect()
    }

    /// Fill columns `[x0, x1)` of row `y`. Caller has clipped.
    fn fill_span(&mut self, y: usize, x0: usize, x1: usize, rgba: [u8; 4]) {
        let bpp = self.format.bytes_per_pixel();
        let row = y * self.stride;
        for px in self.pixels[row + x0 * bpp..row + x1 * bpp].chunks_exact_mut(bpp) {
            self.format.encode(rgba, px);
        }
    }
}

impl Canvas for PixelBuffer {
    fn clear(&mut self, color: Color) {
        let rgba = color.rgba();
        let bpp = self.format.bytes_per_pixel();
        for px in self.pixels.chunks_exact_mut(bpp) {
            self.format.encode(rgba, px);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(i64::from(self.width));
        let y1 = (y + h).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let rgba = color.rgba();
        for row in y0..y1 {
            self.fill_span(row as usize, x0 as usize, x1 as usize, rgba);
        }
    }

    /// Pixel (px, py) is inside when `(px-cx)² + (py-cy)² <= r²`.
    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, color: Color) {
        if r <= 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let rgba = color.rgba();
        let top = (cy - r).max(0);
        let bottom = (cy + r).min(i64::from(self.height) - 1);
        for py in top..=bottom {
            let dy = py - cy;
            let half = (r * r - dy * dy).isqrt();
            let x0 = (cx - half).max(0);
            let x1 = (cx + half + 1).min(i64::from(self.width));
            if x0 < x1 {
                self.fill_span(py as usize, x0 as usize, x1 as usize, rgba);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
