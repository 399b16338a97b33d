use duskcast_common::{Pose, Side};
use duskcast_map::Map;
use glam::Vec2;

use crate::caster::{RayCaster, Start, axis_setup, column_angle, ray_direction};
use crate::hit::DistanceBuffer;

/// Structure-of-arrays DDA state, one lane per screen column.
///
/// Reused across frames; vectors only grow.
#[derive(Debug, Default)]
pub(crate) struct Lanes {
    /// `(fov bits, columns)` the angle table was built for.
    table_key: Option<(u32, usize)>,
    sin_rel: Vec<f32>,
    cos_rel: Vec<f32>,

    dir_x: Vec<f32>,
    dir_y: Vec<f32>,
    delta_x: Vec<f32>,
    delta_y: Vec<f32>,
    side_x: Vec<f32>,
    side_y: Vec<f32>,
    map_x: Vec<i32>,
    map_y: Vec<i32>,
    step_x: Vec<i32>,
    step_y: Vec<i32>,
    /// Indices of lanes still stepping, compacted after every step.
    active: Vec<u32>,
}

impl Lanes {
    fn update_angles(&mut self, fov: f32, columns: usize) {
        let key = (fov.to_bits(), columns);
        if self.table_key == Some(key) {
            return;
        }
        self.sin_rel.clear();
        self.cos_rel.clear();
        for i in 0..columns {
            let (s, c) = column_angle(i, fov, columns).sin_cos();
            self.sin_rel.push(s);
            self.cos_rel.push(c);
        }
        self.table_key = Some(key);
    }

    fn reset(&mut self, columns: usize) {
        for v in [
            &mut self.dir_x,
            &mut self.dir_y,
            &mut self.delta_x,
            &mut self.delta_y,
            &mut self.side_x,
            &mut self.side_y,
        ] {
            v.clear();
            v.resize(columns, 0.0);
        }
        for v in [
            &mut self.map_x,
            &mut self.map_y,
            &mut self.step_x,
            &mut self.step_y,
        ] {
            v.clear();
            v.resize(columns, 0);
        }
        self.active.clear();
        self.active.extend(0..columns as u32);
    }
}

impl RayCaster {
    /// Cast `columns` rays spread across `fov` and return the filled buffer.
    ///
    /// All rays advance one grid step per pass, finished lanes drop out of
    /// the active set. Equivalent to [`RayCaster::cast_column`] per column.
    pub fn cast_all(&mut self, map: &Map, pose: &Pose, fov: f32, columns: usize) -> &DistanceBuffer {
        let params = self.params;
        let lanes = &mut self.lanes;
        let out = self.buffer.prepare(columns);
        if columns == 0 {
            return &self.buffer;
        }
        lanes.update_angles(fov, columns);

        let origin = pose.position() / params.tile_size;
        let (x0, y0) = match Start::classify(map, origin) {
            Start::Outside { x, y } => {
                out.fill(params.miss(x, y, Side::Vertical, params.max_depth));
                return &self.buffer;
            }
            Start::Solid { x, y, material_id } => {
                out.fill(params.inside(x, y, material_id));
                return &self.buffer;
            }
            Start::Open { x, y } => (x, y),
        };

        lanes.reset(columns);
        let view = pose.angle.sin_cos();
        for i in 0..columns {
            let dir = ray_direction(view, (lanes.sin_rel[i], lanes.cos_rel[i]));
            let (sx, dx, side_x) = axis_setup(origin.x, x0, dir.x);
            let (sy, dy, side_y) = axis_setup(origin.y, y0, dir.y);
            lanes.dir_x[i] = dir.x;
            lanes.dir_y[i] = dir.y;
            lanes.step_x[i] = sx;
            lanes.step_y[i] = sy;
            lanes.delta_x[i] = dx;
            lanes.delta_y[i] = dy;
            lanes.side_x[i] = side_x;
            lanes.side_y[i] = side_y;
            lanes.map_x[i] = x0;
            lanes.map_y[i] = y0;
        }

        let mut passes = 0usize;
        while !lanes.active.is_empty() {
            passes += 1;
            let mut kept = 0;
            for k in 0..lanes.active.len() {
                let i = lanes.active[k] as usize;
                let (t, axis) = if lanes.side_x[i] < lanes.side_y[i] {
                    let t = lanes.side_x[i];
                    lanes.side_x[i] += lanes.delta_x[i];
                    lanes.map_x[i] += lanes.step_x[i];
                    (t, Side::Vertical)
                } else {
                    let t = lanes.side_y[i];
                    lanes.side_y[i] += lanes.delta_y[i];
                    lanes.map_y[i] += lanes.step_y[i];
                    (t, Side::Horizontal)
                };
                let dir = Vec2::new(lanes.dir_x[i], lanes.dir_y[i]);
                match params.inspect_cell(
                    map,
                    origin,
                    dir,
                    lanes.cos_rel[i],
                    params.max_depth,
                    t,
                    (lanes.map_x[i], lanes.map_y[i]),
                    axis,
                ) {
                    Some(hit) => out[i] = hit,
                    None => {
                        lanes.active[kept] = i as u32;
                        kept += 1;
                    }
                }
            }
            lanes.active.truncate(kept);
        }

        tracing::trace!(columns, passes, "batch cast");
        &self.buffer
    }
}
