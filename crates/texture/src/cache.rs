use std::collections::HashMap;

use duskcast_common::{EngineConfig, Rgba, Side};

use crate::texture::Texture;

/// A texture re-laid out column-major with shading baked in.
///
/// Every column is a contiguous slice so the wall pass can copy it straight
/// into a screen column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStrip {
    width: u32,
    height: u32,
    columns: Vec<Rgba>,
}

impl ColumnStrip {
    fn shaded(texture: &Texture, brightness: f32) -> Self {
        let (width, height) = (texture.width(), texture.height());
        let mut columns = Vec::with_capacity(width as usize * height as usize);
        for x in 0..width {
            for y in 0..height {
                columns.push(texture.sample(x, y).scaled(brightness));
            }
        }
        Self {
            width,
            height,
            columns,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels of texture column `x` (wrapping), top to bottom.
    pub fn column_at(&self, x: u32) -> &[Rgba] {
        let x = (x % self.width) as usize;
        let h = self.height as usize;
        &self.columns[x * h..(x + 1) * h]
    }

    /// Pixels of the column at fractional offset `u` along the face.
    pub fn column(&self, u: f32) -> &[Rgba] {
        let x = (u * self.width as f32).clamp(0.0, (self.width - 1) as f32) as u32;
        self.column_at(x)
    }
}

/// Pre-shaded wall strips keyed by material, distance bucket and face side.
///
/// Built once per level load. Read-only afterwards, so it can be shared by
/// reference between render passes.
#[derive(Debug, Clone)]
pub struct TextureCache {
    max_depth: f32,
    buckets: usize,
    /// Per material: `buckets * 2` strips indexed by `bucket * 2 + side`.
    entries: HashMap<u16, Box<[ColumnStrip]>>,
    fallback: Box<[ColumnStrip]>,
}

impl TextureCache {
    /// Shade every texture for every distance bucket and side.
    pub fn build(textures: impl IntoIterator<Item = (u16, Texture)>, config: &EngineConfig) -> Self {
        let buckets = config.distance_buckets.max(1);
        let shade_all = |texture: &Texture| -> Box<[ColumnStrip]> {
            let mut strips = Vec::with_capacity(buckets * 2);
            for bucket in 0..buckets {
                let bucket_mid = (bucket as f32 + 0.5) * config.max_depth / buckets as f32;
                let distance_shade = (1.0 - bucket_mid / config.shade_falloff).max(0.2);
                for side in Side::ALL {
                    let tint = match side {
                        Side::Vertical => 1.0,
                        Side::Horizontal => config.side_tint,
                    };
                    strips.push(ColumnStrip::shaded(texture, distance_shade * tint));
                }
            }
            strips.into_boxed_slice()
        };

        let entries: HashMap<u16, Box<[ColumnStrip]>> = textures
            .into_iter()
            .map(|(material_id, texture)| (material_id, shade_all(&texture)))
            .collect();
        let fallback = shade_all(&Texture::checker(64, 64, Rgba::GRAY, Rgba::DARK_GRAY, 8));

        tracing::debug!(
            materials = entries.len(),
            buckets,
            strips = (entries.len() + 1) * buckets * 2,
            "texture cache built"
        );

        Self {
            max_depth: config.max_depth,
            buckets,
            entries,
            fallback,
        }
    }

    /// Cache over the procedural set: 1 stone, 2 brick, 3 metal, 4 tech,
    /// 5 secret and 9 door.
    pub fn with_default_textures(config: &EngineConfig) -> Self {
        let size = 64;
        Self::build(
            [
                (1, Texture::stone(size, size, 1)),
                (
                    2,
                    Texture::bricks(size, size, Rgba::rgb(150, 60, 40), Rgba::rgb(110, 110, 100), 2),
                ),
                (3, Texture::metal(size, size, 3)),
                (4, Texture::tech(size, size, 4)),
                (5, Texture::secret(size, size, 5)),
                (
                    9,
                    Texture::bricks(size, size, Rgba::rgb(110, 80, 50), Rgba::rgb(60, 40, 25), 9),
                ),
            ],
            config,
        )
    }

    /// Distance bucket for a perpendicular distance.
    pub fn bucket(&self, distance: f32) -> usize {
        if distance.is_nan() || distance <= 0.0 {
            return 0;
        }
        let b = (distance / self.max_depth * self.buckets as f32) as usize;
        b.min(self.buckets - 1)
    }

    /// Shaded strip for a wall hit. Unknown materials get the fallback strip.
    pub fn get_strip(&self, material_id: u16, distance: f32, side: Side) -> &ColumnStrip {
        let idx = self.bucket(distance) * 2 + side.index();
        match self.entries.get(&material_id) {
            Some(strips) => &strips[idx],
            None => &self.fallback[idx],
        }
    }

    pub fn contains(&self, material_id: u16) -> bool {
        self.entries.contains_key(&material_id)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets
    }

    pub fn material_count(&self) -> usize {
        self.entries.len()
    }
}
