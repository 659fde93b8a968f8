//! Software surface backed by an `image::RgbaImage`.
//!
//! Used for headless runs, screenshots and tests. Rectangles are snapped to
//! whole pixels (a pixel is covered when its top-left corner is inside the
//! rectangle) and alpha-blended over the existing contents.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::{Color, PixelRect, Surface};
use crate::error::{EaselError, Result};

/// An in-memory RGBA drawing surface.
pub struct Canvas {
    pixels: RgbaImage,
    draw_calls: u64,
}

impl Canvas {
    /// Create a canvas filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            draw_calls: 0,
        }
    }

    /// Read a pixel. Returns `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.pixels.width() || y >= self.pixels.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.pixels.get_pixel(x, y);
        Some(Color::from_rgba8(r, g, b, a))
    }

    /// Underlying pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Draw operations in the current frame, the clear included. The game loop
    /// resets the counter at the start of every frame.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    pub fn reset_draw_calls(&mut self) {
        self.draw_calls = 0;
    }

    /// Write the current contents to a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| EaselError::Image {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Clip a float rectangle to the pixel grid: returns (x0, y0, x1, y1), exclusive end.
    fn clip(&self, x: f32, y: f32, width: f32, height: f32) -> Option<(u32, u32, u32, u32)> {
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        let (cw, ch) = (self.pixels.width() as f32, self.pixels.height() as f32);
        let x0 = x.ceil().clamp(0.0, cw);
        let y0 = y.ceil().clamp(0.0, ch);
        let x1 = (x + width).ceil().clamp(0.0, cw);
        let y1 = (y + height).ceil().clamp(0.0, ch);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn blend(&mut self, x: u32, y: u32, src: [u8; 4]) {
        let alpha = src[3] as u32;
        if alpha == 0 {
            return;
        }
        let dst = self.pixels.get_pixel_mut(x, y);
        if alpha == 255 {
            *dst = Rgba(src);
            return;
        }
        let inv = 255 - alpha;
        for i in 0..3 {
            dst.0[i] = ((src[i] as u32 * alpha + dst.0[i] as u32 * inv) / 255) as u8;
        }
        dst.0[3] = (alpha + dst.0[3] as u32 * inv / 255).min(255) as u8;
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.pixels.dimensions() != (width, height) {
            self.pixels = RgbaImage::new(width, height);
        }
    }

    fn begin_frame(&mut self) {
        self.reset_draw_calls();
    }

    /// Replace every pixel, including alpha. Counts as one draw call.
    fn clear(&mut self, color: Color) {
        self.draw_calls += 1;
        let rgba = Rgba(color.to_rgba8());
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.draw_calls += 1;
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let rgba = color.to_rgba8();
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, rgba);
            }
        }
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        src: PixelRect,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.draw_calls += 1;
        if src.width == 0 || src.height == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return;
        };
        let sx = src.width as f32 / width;
        let sy = src.height as f32 / height;
        for py in y0..y1 {
            // Nearest-neighbour sample at the pixel's top-left corner.
            let v = ((py as f32 - y) * sy).floor() as u32;
            let iy = src.y + v.min(src.height - 1);
            for px in x0..x1 {
                let u = ((px as f32 - x) * sx).floor() as u32;
                let ix = src.x + u.min(src.width - 1);
                if ix >= image.width() || iy >= image.height() {
                    continue;
                }
                let texel = image.get_pixel(ix, iy).0;
                self.blend(px, py, texel);
            }
        }
    }
}
