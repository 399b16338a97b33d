use duskcast_common::{ConfigError, DISTANCE_EPSILON, EngineConfig, Pose, Side};
use duskcast_map::{DEFAULT_SOLID_MATERIAL, Map};
use glam::Vec2;

use crate::batch::Lanes;
use crate::hit::{DistanceBuffer, HitResult};

#[derive(Debug, thiserror::Error)]
pub enum RaycastError {
    #[error("cannot cast against a map with zero area ({width}x{height})")]
    EmptyMap { width: usize, height: usize },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Angle of column `index` relative to the view direction.
///
/// Columns are spaced evenly from `-fov / 2` to `+fov / 2` inclusive; a
/// single column looks straight ahead.
pub fn column_angle(index: usize, fov: f32, columns: usize) -> f32 {
    if columns <= 1 {
        return 0.0;
    }
    -fov * 0.5 + fov * index as f32 / (columns - 1) as f32
}

/// Unit ray direction for a view angle and a column offset, by the angle-sum
/// identity so every column shares one `sin_cos` of the view angle.
#[inline]
pub(crate) fn ray_direction(view: (f32, f32), rel: (f32, f32)) -> Vec2 {
    let (p_sin, p_cos) = view;
    let (d_sin, d_cos) = rel;
    Vec2::new(p_cos * d_cos - p_sin * d_sin, p_sin * d_cos + p_cos * d_sin)
}

/// DDA setup along one axis: `(step, delta, first boundary distance)`.
#[inline]
pub(crate) fn axis_setup(origin: f32, cell: i32, dir: f32) -> (i32, f32, f32) {
    let delta = if dir == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / dir).abs()
    };
    if dir < 0.0 {
        (-1, delta, (origin - cell as f32) * delta)
    } else {
        (1, delta, (cell as f32 + 1.0 - origin) * delta)
    }
}

/// Where a ray starts relative to the grid.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Start {
    Outside { x: i32, y: i32 },
    Solid { x: i32, y: i32, material_id: u16 },
    Open { x: i32, y: i32 },
}

impl Start {
    pub(crate) fn classify(map: &Map, origin: Vec2) -> Self {
        let (x, y) = (origin.x.floor() as i32, origin.y.floor() as i32);
        match map.cell(x, y) {
            None => Start::Outside { x, y },
            Some(cell) if cell.is_solid() => Start::Solid {
                x,
                y,
                material_id: cell.material_id,
            },
            Some(_) => Start::Open { x, y },
        }
    }
}

/// The fixed per-caster numbers every ray needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CastParams {
    pub(crate) tile_size: f32,
    pub(crate) max_depth: f32,
    pub(crate) projection_constant: f32,
}

impl CastParams {
    pub(crate) fn miss(&self, x: i32, y: i32, side: Side, depth: f32) -> HitResult {
        HitResult {
            distance: depth,
            raw_distance: depth,
            material_id: DEFAULT_SOLID_MATERIAL,
            side,
            wall_u: 0.0,
            map_x: x,
            map_y: y,
            hit: false,
        }
    }

    pub(crate) fn inside(&self, x: i32, y: i32, material_id: u16) -> HitResult {
        HitResult {
            distance: 0.0,
            raw_distance: 0.0,
            material_id,
            side: Side::Vertical,
            wall_u: 0.0,
            map_x: x,
            map_y: y,
            hit: true,
        }
    }

    /// Result for a ray that has just crossed into cell `(x, y)` at grid
    /// distance `t`, or `None` if the cell is open and the ray goes on.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub(crate) fn inspect_cell(
        &self,
        map: &Map,
        origin: Vec2,
        dir: Vec2,
        cos_rel: f32,
        depth: f32,
        t: f32,
        (x, y): (i32, i32),
        axis: Side,
    ) -> Option<HitResult> {
        let raw = t * self.tile_size;
        if raw > depth {
            return Some(self.miss(x, y, axis, depth));
        }
        let cell = match map.cell(x, y) {
            None => return Some(self.miss(x, y, axis, depth)),
            Some(cell) if !cell.is_solid() => return None,
            Some(cell) => cell,
        };

        let point = origin + dir * t;
        let off = (point - Vec2::new(x as f32 + 0.5, y as f32 + 0.5)).abs();
        let side = if off.x > off.y {
            Side::Vertical
        } else if off.y > off.x {
            Side::Horizontal
        } else {
            axis
        };
        let along = match side {
            Side::Vertical => point.y,
            Side::Horizontal => point.x,
        };

        Some(HitResult {
            distance: (raw * cos_rel).max(0.0),
            raw_distance: raw,
            material_id: cell.material_id,
            side,
            wall_u: along - along.floor(),
            map_x: x,
            map_y: y,
            hit: true,
        })
    }

    /// Step one ray through the grid from `origin` (grid units).
    pub(crate) fn trace(&self, map: &Map, origin: Vec2, dir: Vec2, cos_rel: f32, depth: f32) -> HitResult {
        let (mut x, mut y) = match Start::classify(map, origin) {
            Start::Outside { x, y } => return self.miss(x, y, Side::Vertical, depth),
            Start::Solid { x, y, material_id } => return self.inside(x, y, material_id),
            Start::Open { x, y } => (x, y),
        };
        let (step_x, delta_x, mut side_x) = axis_setup(origin.x, x, dir.x);
        let (step_y, delta_y, mut side_y) = axis_setup(origin.y, y, dir.y);

        loop {
            let (t, axis) = if side_x < side_y {
                let t = side_x;
                side_x += delta_x;
                x += step_x;
                (t, Side::Vertical)
            } else {
                let t = side_y;
                side_y += delta_y;
                y += step_y;
                (t, Side::Horizontal)
            };
            if let Some(hit) = self.inspect_cell(map, origin, dir, cos_rel, depth, t, (x, y), axis) {
                return hit;
            }
        }
    }
}

/// Casts rays against a [`Map`].
///
/// The map is borrowed per call so door changes between frames need no
/// rebuild. Scratch space for batch casting is owned here and reused.
#[derive(Debug)]
pub struct RayCaster {
    pub(crate) params: CastParams,
    pub(crate) lanes: Lanes,
    pub(crate) buffer: DistanceBuffer,
}

impl RayCaster {
    pub fn new(map: &Map, config: &EngineConfig) -> Result<Self, RaycastError> {
        config.validate()?;
        if map.width() == 0 || map.height() == 0 {
            return Err(RaycastError::EmptyMap {
                width: map.width(),
                height: map.height(),
            });
        }
        Ok(Self {
            params: CastParams {
                tile_size: config.tile_size,
                max_depth: config.max_depth,
                projection_constant: config.projection_constant(),
            },
            lanes: Lanes::default(),
            buffer: DistanceBuffer::new(),
        })
    }

    pub fn max_depth(&self) -> f32 {
        self.params.max_depth
    }

    pub fn tile_size(&self) -> f32 {
        self.params.tile_size
    }

    pub fn projection_constant(&self) -> f32 {
        self.params.projection_constant
    }

    /// Results of the last [`RayCaster::cast_all`].
    pub fn buffer(&self) -> &DistanceBuffer {
        &self.buffer
    }

    /// Cast one ray at `relative_angle` off the view direction.
    pub fn cast_column(&self, map: &Map, pose: &Pose, relative_angle: f32) -> HitResult {
        let rel = relative_angle.sin_cos();
        let dir = ray_direction(pose.angle.sin_cos(), rel);
        let origin = pose.position() / self.params.tile_size;
        self.params.trace(map, origin, dir, rel.1, self.params.max_depth)
    }

    /// On-screen wall height in pixels for a perpendicular distance.
    pub fn projected_height(&self, distance: f32) -> f32 {
        self.params.tile_size / distance.max(DISTANCE_EPSILON) * self.params.projection_constant
    }

    /// Whether the straight segment between two world points crosses no
    /// solid cell.
    pub fn line_of_sight(&self, map: &Map, from: Vec2, to: Vec2) -> bool {
        let origin = from / self.params.tile_size;
        if !matches!(Start::classify(map, origin), Start::Open { .. }) {
            return false;
        }
        let segment = to - from;
        let length = segment.length();
        if length <= DISTANCE_EPSILON {
            return true;
        }
        !self
            .params
            .trace(map, origin, segment / length, 1.0, length)
            .hit
    }
}
