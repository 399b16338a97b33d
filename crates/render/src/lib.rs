//! Scene renderer: turns a map, a pose and entities into pixels.
//!
//! # Invariants
//! - The renderer never mutates the map or the entities; it reads them for
//!   one frame and writes only to the caller's [`Surface`].
//! - Billboards are drawn far to near and a billboard column is skipped
//!   wherever a wall is closer.
//!
//! A frame is: floor/ceiling gradient with stars and moon, one wall strip per
//! cast column, then the billboard pass over the entities the spatial grid
//! reports as in view.

mod billboard;
mod scene;
mod sky;
mod sprites;
mod stats;
mod surface;
mod walls;

pub use billboard::{
    Billboard, BotSprite, EntityLookup, ParticleSprite, ProjectileSprite, SceneObject, UNTEXTURED,
};
pub use scene::{RenderError, SceneRenderer};
pub use sprites::SpritePass;
pub use stats::{FrameReport, FrameStats, FrameTimer};
pub use surface::{Framebuffer, Surface};

pub fn crate_info() -> &'static str {
    "duskcast-render v0.1.0"
}
