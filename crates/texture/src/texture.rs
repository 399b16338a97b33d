use duskcast_common::Rgba;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Errors from building a [`Texture`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TextureError {
    #[error("texture has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("expected {expected} pixels for a {width}x{height} texture, got {actual}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// An immutable CPU pixmap, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A texture of one colour. Zero dimensions are raised to 1.
    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixel at `(x, y)`, wrapping both axes.
    #[inline]
    pub fn sample(&self, x: u32, y: u32) -> Rgba {
        let xi = (x % self.width) as usize;
        let yi = (y % self.height) as usize;
        self.pixels[yi * self.width as usize + xi]
    }

    /// Pixel at normalised coordinates, clamped to the texture.
    #[inline]
    pub fn sample_uv(&self, u: f32, v: f32) -> Rgba {
        let x = (u * self.width as f32).clamp(0.0, (self.width - 1) as f32) as u32;
        let y = (v * self.height as f32).clamp(0.0, (self.height - 1) as f32) as u32;
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    fn put(&mut self, x: u32, y: u32, c: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = c;
        }
    }

    // --- Procedural generators ---

    /// Base colour with per-pixel noise of +/- `variation`.
    pub fn noise(width: u32, height: u32, base: Rgba, variation: i32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let variation = variation.abs();
        let mut tex = Self::solid(width, height, base);
        for px in &mut tex.pixels {
            let jitter = |v: u8, rng: &mut ChaCha8Rng| -> u8 {
                (v as i32 + rng.gen_range(-variation..=variation)).clamp(0, 255) as u8
            };
            *px = Rgba::rgb(
                jitter(base.r, &mut rng),
                jitter(base.g, &mut rng),
                jitter(base.b, &mut rng),
            );
        }
        tex
    }

    /// Running-bond brick courses with mortar lines.
    pub fn bricks(width: u32, height: u32, brick: Rgba, mortar: Rgba, seed: u64) -> Self {
        let mut tex = Self::noise(width, height, brick, 15, seed);
        let brick_w = (width / 2).max(1);
        let brick_h = (height / 4).max(1);
        let mortar_size = 2;
        for y in 0..tex.height {
            let row = y / brick_h;
            let offset = if row % 2 == 1 { brick_w / 2 } else { 0 };
            for x in 0..tex.width {
                if y % brick_h < mortar_size || (x + offset) % brick_w < mortar_size {
                    tex.put(x, y, mortar);
                }
            }
        }
        tex
    }

    /// Large slate blocks with a few dark cracks.
    pub fn stone(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base_shade = 80;
        let mut tex = Self::solid(width, height, Rgba::rgb(base_shade, base_shade, base_shade));
        let block = 16;
        for by in (0..tex.height).step_by(block) {
            for bx in (0..tex.width).step_by(block) {
                let val = (base_shade as i32 + rng.gen_range(-20..=20)).clamp(0, 255) as u8;
                for y in by..(by + block as u32).min(tex.height) {
                    for x in bx..(bx + block as u32).min(tex.width) {
                        tex.put(x, y, Rgba::rgb(val, val, val));
                    }
                }
            }
        }
        let crack = Rgba::rgb(40, 40, 40);
        for _ in 0..10 {
            let x = rng.gen_range(0..tex.width);
            let y = rng.gen_range(0..tex.height);
            for cy in y..(y + 6).min(tex.height) {
                for cx in x..(x + 2).min(tex.width) {
                    tex.put(cx, cy, crack);
                }
            }
        }
        tex
    }

    /// Brushed metal panel with a border and corner rivets.
    pub fn metal(width: u32, height: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let base = Rgba::rgb(140, 140, 150);
        let mut tex = Self::solid(width, height, base);
        for y in 0..tex.height {
            let shade: i32 = rng.gen_range(-10..=10);
            let row = Rgba::rgb(
                (base.r as i32 + shade) as u8,
                (base.g as i32 + shade) as u8,
                (base.b as i32 + shade) as u8,
            );
            for x in 0..tex.width {
                tex.put(x, y, row);
            }
        }
        let edge = Rgba::rgb(90, 90, 100);
        for x in 0..tex.width {
            tex.put(x, 0, edge);
            tex.put(x, tex.height - 1, edge);
        }
        for y in 0..tex.height {
            tex.put(0, y, edge);
            tex.put(tex.width - 1, y, edge);
        }
        let rivet = Rgba::rgb(200, 200, 210);
        let inset = 3.min(tex.width.saturating_sub(1)).min(tex.height.saturating_sub(1));
        for (x, y) in [
            (inset, inset),
            (tex.width - 1 - inset, inset),
            (inset, tex.height - 1 - inset),
            (tex.width - 1 - inset, tex.height - 1 - inset),
        ] {
            tex.put(x, y, rivet);
        }
        tex
    }

    /// Dark panel with a glowing circuit grid.
    pub fn tech(width: u32, height: u32, seed: u64) -> Self {
        let mut tex = Self::noise(width, height, Rgba::rgb(30, 34, 44), 6, seed);
        let glow = Rgba::rgb(40, 200, 220);
        let spacing = (width / 4).max(2);
        for y in 0..tex.height {
            for x in 0..tex.width {
                if x % spacing == 0 || y % spacing == 0 {
                    tex.put(x, y, glow);
                }
            }
        }
        tex
    }

    /// Stone that is subtly off, hinting at a secret passage.
    pub fn secret(width: u32, height: u32, seed: u64) -> Self {
        let mut tex = Self::stone(width, height, seed);
        let mark = Rgba::rgb(96, 84, 70);
        let mid = tex.height / 2;
        for x in (0..tex.width).step_by(3) {
            tex.put(x, mid, mark);
        }
        tex
    }

    /// Checkerboard of `cell`-sized squares; the fallback texture.
    pub fn checker(width: u32, height: u32, a: Rgba, b: Rgba, cell: u32) -> Self {
        let cell = cell.max(1);
        let mut tex = Self::solid(width, height, a);
        for y in 0..tex.height {
            for x in 0..tex.width {
                if ((x / cell) + (y / cell)) % 2 == 1 {
                    tex.put(x, y, b);
                }
            }
        }
        tex
    }

    /// Opaque disc with a soft halo on a transparent background.
    pub fn orb(size: u32, color: Rgba) -> Self {
        let size = size.max(1);
        let mut tex = Self::solid(size, size, Rgba::TRANSPARENT);
        let c = size as f32 * 0.5;
        let r = size as f32 * 0.3;
        for y in 0..size {
            for x in 0..size {
                let dx = x as f32 + 0.5 - c;
                let dy = y as f32 + 0.5 - c;
                let d = (dx * dx + dy * dy).sqrt();
                if d <= r {
                    let t = 1.0 - d / r;
                    let mut core = color.lerp(Rgba::WHITE, t * 0.85);
                    core.a = 255;
                    tex.put(x, y, core);
                } else {
                    let t = (1.0 - (d - r) / (r * 0.9)).clamp(0.0, 1.0);
                    if t > 0.0 {
                        let mut halo = color;
                        halo.a = (t * 180.0) as u8;
                        tex.put(x, y, halo);
                    }
                }
            }
        }
        tex
    }

    /// A flat elliptical body silhouette on a transparent background.
    pub fn silhouette(width: u32, height: u32, body: Rgba) -> Self {
        let mut tex = Self::solid(width, height, Rgba::TRANSPARENT);
        let cx = tex.width as f32 * 0.5;
        let cy = tex.height as f32 * 0.6;
        let rx = tex.width as f32 * 0.23;
        let ry = tex.height as f32 * 0.35;
        for y in 0..tex.height {
            for x in 0..tex.width {
                let nx = (x as f32 - cx) / rx;
                let ny = (y as f32 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    let mut c = body;
                    c.a = 255;
                    tex.put(x, y, c);
                }
            }
        }
        tex
    }
}
