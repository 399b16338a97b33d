use std::time::Instant;

use duskcast_common::{EngineConfig, EntityId, Pose, Theme};
use duskcast_map::Map;
use duskcast_query::EntityQueryFacade;
use duskcast_raycast::{DistanceBuffer, RayCaster, RaycastError};
use duskcast_spatial::SpatialGrid;
use duskcast_texture::{SpriteAtlas, TextureCache};

use crate::billboard::EntityLookup;
use crate::sky::Sky;
use crate::sprites::SpritePass;
use crate::stats::{FrameStats, FrameTimer};
use crate::surface::Surface;
use crate::walls;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("raycast error: {0}")]
    Raycast(#[from] RaycastError),
    #[error("surface is {actual_width}x{actual_height}, renderer expects {width}x{height}")]
    SurfaceMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Draws complete frames: background and sky, walls, billboards.
///
/// Owns the caster, its distance buffer and the sprite scratch, all reused
/// between frames. Textures and sprites are borrowed, immutable for the
/// renderer's lifetime.
#[derive(Debug)]
pub struct SceneRenderer<'a> {
    config: EngineConfig,
    caster: RayCaster,
    textures: &'a TextureCache,
    sprites: SpritePass<'a>,
    sky: Sky,
    zoomed: bool,
    visible: Vec<EntityId>,
    timer: FrameTimer,
    stats: FrameStats,
}

impl<'a> SceneRenderer<'a> {
    pub fn new(
        map: &Map,
        config: EngineConfig,
        textures: &'a TextureCache,
        atlas: &'a SpriteAtlas,
    ) -> Result<Self, RenderError> {
        let caster = RayCaster::new(map, &config)?;
        tracing::debug!(
            width = config.screen_width,
            height = config.screen_height,
            columns = config.column_count(),
            "scene renderer created"
        );
        Ok(Self {
            sprites: SpritePass::new(atlas, &config),
            sky: Sky::new(
                config.screen_width,
                config.screen_height,
                config.star_count,
                config.sky_seed,
            ),
            caster,
            textures,
            zoomed: false,
            visible: Vec::new(),
            timer: FrameTimer::default(),
            stats: FrameStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The caster, for game-side queries such as line of sight.
    pub fn caster(&self) -> &RayCaster {
        &self.caster
    }

    /// Wall distances from the last frame.
    pub fn distance_buffer(&self) -> &DistanceBuffer {
        self.caster.buffer()
    }

    pub fn set_zoomed(&mut self, zoomed: bool) {
        self.zoomed = zoomed;
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    /// Field of view in effect for the next frame.
    pub fn fov(&self) -> f32 {
        self.config.effective_fov(self.zoomed)
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// Floor and ceiling theme of the cell the player stands in.
    pub fn theme_at(&self, map: &Map, pose: &Pose) -> Theme {
        let tile = self.config.tile_size;
        let x = (pose.x / tile).floor() as i32;
        let y = (pose.y / tile).floor() as i32;
        let index = map.cell(x, y).map_or(0, |c| c.theme);
        self.config.theme(index)
    }

    /// Render one frame into `surface`, which must match the configured
    /// screen size.
    pub fn render<L, S>(
        &mut self,
        map: &Map,
        pose: &Pose,
        grid: &SpatialGrid,
        entities: &L,
        surface: &mut S,
    ) -> Result<FrameStats, RenderError>
    where
        L: EntityLookup + ?Sized,
        S: Surface + ?Sized,
    {
        let (width, height) = (surface.width(), surface.height());
        if (width, height) != (self.config.screen_width, self.config.screen_height) {
            return Err(RenderError::SurfaceMismatch {
                width: self.config.screen_width,
                height: self.config.screen_height,
                actual_width: width,
                actual_height: height,
            });
        }

        let _span = tracing::info_span!("render_frame", zoomed = self.zoomed).entered();
        let frame_start = Instant::now();

        let fov = self.fov();
        let columns = self.config.column_count();
        let horizon = walls::horizon(height, pose.pitch);

        let theme = self.theme_at(map, pose);
        walls::draw_background(surface, theme, horizon);
        self.sky.draw(surface, pose.angle, pose.pitch, horizon, theme.ceiling);
        self.caster.cast_all(map, pose, fov, columns);
        let wall_hits =
            walls::draw_walls(surface, &self.caster, self.textures, &self.config, horizon);

        EntityQueryFacade::new(grid, &self.config).visible_subset_into(pose, fov, &mut self.visible);
        let candidates = self.visible.iter().filter_map(|id| entities.get(*id));
        let sprites_drawn =
            self.sprites
                .render_sprites(pose, fov, self.caster.buffer(), candidates, surface);

        let frame_time = frame_start.elapsed();
        self.stats = FrameStats {
            columns_cast: columns,
            wall_hits,
            sprites_considered: self.visible.len(),
            sprites_drawn,
            frame_time,
        };
        self.timer.record(&self.stats);

        tracing::trace!(
            columns,
            wall_hits,
            sprites = sprites_drawn,
            frame_us = frame_time.as_micros() as u64,
            "frame rendered"
        );

        Ok(self.stats)
    }
}
