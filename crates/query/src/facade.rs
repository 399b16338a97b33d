use std::f32::consts::{PI, TAU};

use duskcast_common::{EngineConfig, EntityId, Pose};
use duskcast_spatial::SpatialGrid;
use glam::Vec2;

/// Wrap an angle into `(-pi, pi]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Read-only view over a [`SpatialGrid`] for per-frame questions.
#[derive(Debug, Clone, Copy)]
pub struct EntityQueryFacade<'a> {
    grid: &'a SpatialGrid,
    config: &'a EngineConfig,
}

impl<'a> EntityQueryFacade<'a> {
    pub fn new(grid: &'a SpatialGrid, config: &'a EngineConfig) -> Self {
        Self { grid, config }
    }

    pub fn grid(&self) -> &'a SpatialGrid {
        self.grid
    }

    /// Distance from the player to the closest tracked entity, or infinity
    /// when there is none.
    pub fn nearest_enemy_distance(&self, pose: &Pose) -> f32 {
        let center = pose.position();
        self.grid
            .nearest(center)
            .and_then(|id| self.grid.position(id))
            .map_or(f32::INFINITY, |pos| pos.distance(center))
    }

    /// Entities within `max_depth` whose bearing lies inside `fov / 2` plus
    /// the sprite margin.
    pub fn visible_subset(&self, pose: &Pose, fov: f32) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.visible_subset_into(pose, fov, &mut out);
        out
    }

    /// Like [`EntityQueryFacade::visible_subset`] but fills a reusable buffer.
    pub fn visible_subset_into(&self, pose: &Pose, fov: f32, out: &mut Vec<EntityId>) {
        out.clear();
        let center = pose.position();
        self.grid.query_radius_into(center, self.config.max_depth, out);
        let limit = fov * 0.5 + self.config.sprite_margin;
        out.retain(|id| {
            let Some(pos) = self.grid.position(*id) else {
                return false;
            };
            let delta = pos - center;
            if delta == Vec2::ZERO {
                return true;
            }
            normalize_angle(delta.y.atan2(delta.x) - pose.angle).abs() <= limit
        });
        tracing::trace!(visible = out.len(), "visible subset");
    }

    /// Entities in the 3x3 cell neighbourhood of `center`, for collision.
    pub fn nearby(&self, center: Vec2) -> Vec<EntityId> {
        self.grid.get_nearby(center)
    }

    /// Entities within `radius` of `center`.
    pub fn within(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.grid.query_radius(center, radius)
    }
}
