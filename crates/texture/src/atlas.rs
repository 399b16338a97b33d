use std::collections::HashMap;

use duskcast_common::Rgba;

use crate::texture::Texture;

/// Sprite images for billboards, keyed by sprite id.
///
/// Missing ids are not an error: the billboard pass draws a flat disc in the
/// entity's tint instead.
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<u32, Texture>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Procedural sprites: 0-3 enemy silhouettes, 10 a glowing pickup orb.
    pub fn with_default_sprites() -> Self {
        Self::new()
            .with_sprite(0, Texture::silhouette(64, 64, Rgba::rgb(255, 120, 120)))
            .with_sprite(1, Texture::silhouette(64, 64, Rgba::rgb(120, 255, 120)))
            .with_sprite(2, Texture::silhouette(64, 64, Rgba::rgb(120, 120, 255)))
            .with_sprite(3, Texture::silhouette(64, 64, Rgba::rgb(255, 180, 80)))
            .with_sprite(10, Texture::orb(64, Rgba::rgb(255, 240, 80)))
    }

    pub fn with_sprite(mut self, id: u32, texture: Texture) -> Self {
        self.sprites.insert(id, texture);
        self
    }

    pub fn get(&self, id: u32) -> Option<&Texture> {
        self.sprites.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
