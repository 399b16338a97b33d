//! Texture data for the renderer.
//!
//! Walls are drawn from a [`TextureCache`] of pre-shaded column strips built
//! once per level, so the per-frame wall pass is a lookup and never
//! resamples or reshades a texture. Billboards sample the [`SpriteAtlas`].
//!
//! # Invariants
//! - Both caches are immutable after construction.
//! - Lookups never fail: unknown ids resolve to a fallback.

mod atlas;
mod cache;
mod texture;

pub use atlas::SpriteAtlas;
pub use cache::{ColumnStrip, TextureCache};
pub use texture::{Texture, TextureError};

pub fn crate_info() -> &'static str {
    "duskcast-texture v0.1.0"
}
