use std::io::{self, Write};

use duskcast_common::Rgba;

/// A pixel target the renderer writes into.
///
/// Writes outside the surface are ignored by implementations.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn put_pixel(&mut self, x: u32, y: u32, color: Rgba);

    /// Fill rows `y0..y1` of column `x` with one colour.
    fn fill_column(&mut self, x: u32, y0: u32, y1: u32, color: Rgba) {
        for y in y0..y1.min(self.height()) {
            self.put_pixel(x, y, color);
        }
    }
}

/// An owned RGBA8 framebuffer, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, ready for upload to a texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Write the frame as a binary PPM (P6) image, dropping alpha.
    pub fn write_ppm(&self, mut out: impl Write) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width as usize * 3);
        for line in self.pixels.chunks(self.width.max(1) as usize) {
            row.clear();
            for px in line {
                row.extend_from_slice(&[px.r, px.g, px.b]);
            }
            out.write_all(&row)?;
        }
        out.flush()
    }
}

impl Surface for Framebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    fn fill_column(&mut self, x: u32, y0: u32, y1: u32, color: Rgba) {
        if x >= self.width {
            return;
        }
        for y in y0..y1.min(self.height) {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }
}
