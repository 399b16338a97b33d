use duskcast_common::{DISTANCE_EPSILON, EngineConfig, Pose, Rgba};
use duskcast_query::normalize_angle;
use duskcast_raycast::DistanceBuffer;
use duskcast_texture::SpriteAtlas;

use crate::billboard::{Billboard, UNTEXTURED};
use crate::surface::Surface;
use crate::walls::{fog_factor, horizon};

/// Texels at or below this alpha are not drawn.
const ALPHA_CUTOFF: u8 = 8;

#[derive(Debug, Clone, Copy)]
struct QueuedSprite {
    /// Euclidean distance, the painter's sort key.
    distance: f32,
    /// Distance along the view direction, comparable to wall distances.
    depth: f32,
    relative_angle: f32,
    world_size: f32,
    elevation: f32,
    sprite_id: u32,
    tint: Rgba,
}

/// The billboard pass: cull, sort far to near, draw with per-column depth
/// testing against the wall distances.
#[derive(Debug)]
pub struct SpritePass<'a> {
    atlas: &'a SpriteAtlas,
    config: EngineConfig,
    projection_constant: f32,
    queue: Vec<QueuedSprite>,
}

impl<'a> SpritePass<'a> {
    pub fn new(atlas: &'a SpriteAtlas, config: &EngineConfig) -> Self {
        Self {
            atlas,
            config: config.clone(),
            projection_constant: config.projection_constant(),
            queue: Vec::new(),
        }
    }

    /// Draw `candidates` over `surface`. Returns how many billboards put at
    /// least one pixel on screen.
    pub fn render_sprites<'e, S: Surface + ?Sized>(
        &mut self,
        pose: &Pose,
        fov: f32,
        depth: &DistanceBuffer,
        candidates: impl IntoIterator<Item = &'e dyn Billboard>,
        surface: &mut S,
    ) -> usize {
        let origin = pose.position();
        let forward = pose.forward();
        let limit = fov * 0.5 + self.config.sprite_margin;

        self.queue.clear();
        for b in candidates {
            let delta = b.position() - origin;
            let distance = delta.length();
            if distance <= DISTANCE_EPSILON || distance > self.config.max_depth {
                continue;
            }
            let along = delta.dot(forward);
            if along < 0.0 {
                continue;
            }
            let relative_angle = normalize_angle(delta.y.atan2(delta.x) - pose.angle);
            if relative_angle.abs() > limit {
                continue;
            }
            self.queue.push(QueuedSprite {
                distance,
                depth: along.max(DISTANCE_EPSILON),
                relative_angle,
                world_size: 2.0 * b.radius() * b.scale(),
                elevation: b.elevation(),
                sprite_id: b.sprite_id(),
                tint: b.tint(),
            });
        }
        self.queue.sort_by(|a, b| b.distance.total_cmp(&a.distance));

        let horizon = horizon(surface.height(), pose.pitch);
        let mut drawn = 0;
        for sprite in &self.queue {
            if self.draw(sprite, fov, depth, horizon, surface) {
                drawn += 1;
            }
        }
        tracing::trace!(queued = self.queue.len(), drawn, "sprite pass");
        drawn
    }

    fn draw<S: Surface + ?Sized>(
        &self,
        sprite: &QueuedSprite,
        fov: f32,
        depth: &DistanceBuffer,
        horizon: f32,
        surface: &mut S,
    ) -> bool {
        let (width, height) = (surface.width() as f32, surface.height() as f32);
        let k = self.projection_constant;
        let size = sprite.world_size / sprite.depth * k;
        if size.is_nan() || size <= 0.0 {
            return false;
        }
        let screen_x = width * 0.5 + (sprite.relative_angle / fov) * width;
        let wall_px = self.config.tile_size / sprite.depth * k;
        let centre_y = horizon + (0.5 - sprite.elevation) * wall_px;
        let left = screen_x - size * 0.5;
        let top = centre_y - size * 0.5;

        let x0 = left.max(0.0) as u32;
        let x1 = (left + size).min(width).ceil().max(0.0) as u32;
        let y0 = top.max(0.0) as u32;
        let y1 = (top + size).min(height).ceil().max(0.0) as u32;

        let shade = 1.0 - fog_factor(sprite.depth, &self.config);
        let image = match sprite.sprite_id {
            UNTEXTURED => None,
            id => self.atlas.get(id),
        };
        let scale = self.config.render_scale.max(1);
        let last_column = depth.len().saturating_sub(1);

        let mut any = false;
        for x in x0..x1 {
            if sprite.depth >= depth.depth_at(((x / scale) as usize).min(last_column)) {
                continue;
            }
            let u = (x as f32 + 0.5 - left) / size;
            for y in y0..y1 {
                let v = (y as f32 + 0.5 - top) / size;
                let texel = match image {
                    Some(tex) => tex.sample_uv(u, v),
                    None => disc(u, v, sprite.tint),
                };
                if texel.a < ALPHA_CUTOFF {
                    continue;
                }
                surface.put_pixel(x, y, texel.scaled(shade));
                any = true;
            }
        }
        any
    }
}

/// A filled circle inscribed in the unit square.
fn disc(u: f32, v: f32, tint: Rgba) -> Rgba {
    let (du, dv) = (u - 0.5, v - 0.5);
    if du * du + dv * dv <= 0.25 {
        Rgba { a: 255, ..tint }
    } else {
        Rgba::TRANSPARENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_is_round() {
        let red = Rgba::rgb(255, 0, 0);
        assert_eq!(disc(0.5, 0.5, red), red);
        assert_eq!(disc(0.02, 0.02, red).a, 0);
        assert_eq!(disc(0.5, 0.02, red), red);
    }
}
