use duskcast_common::{EngineConfig, Theme};
use duskcast_raycast::RayCaster;
use duskcast_texture::TextureCache;

use crate::surface::Surface;

/// Screen row of the horizon for a pitch offset, clamped to the surface.
pub(crate) fn horizon(height: u32, pitch: f32) -> f32 {
    (height as f32 * 0.5 + pitch).clamp(0.0, height as f32)
}

/// Darkness applied at `distance`, in `0..=darkness_cap`.
pub(crate) fn fog_factor(distance: f32, config: &EngineConfig) -> f32 {
    (distance / config.max_depth).clamp(0.0, config.darkness_cap)
}

/// Ceiling and floor gradients split at the horizon.
///
/// The ceiling runs from a darker zenith down to the theme colour; the floor
/// from a darker far band at the horizon to the theme colour at the bottom.
pub(crate) fn draw_background<S: Surface + ?Sized>(surface: &mut S, theme: Theme, horizon: f32) {
    let (width, height) = (surface.width(), surface.height());
    let zenith = theme.ceiling.darkened(30);
    let far_floor = theme.floor.darkened(40);
    let split = (horizon.round() as u32).min(height);

    for y in 0..height {
        let color = if y < split {
            zenith.lerp(theme.ceiling, y as f32 / split as f32)
        } else {
            let span = (height - split).max(1);
            far_floor.lerp(theme.floor, (y - split) as f32 / span as f32)
        };
        for x in 0..width {
            surface.put_pixel(x, y, color);
        }
    }
}

/// Draw one textured strip per cast column. Returns the number of columns
/// that hit a wall.
///
/// Rows sampling the same texel are filled as one run, so a wall close to
/// the camera costs one fill per texel rather than one write per pixel.
pub(crate) fn draw_walls<S: Surface + ?Sized>(
    surface: &mut S,
    caster: &RayCaster,
    textures: &TextureCache,
    config: &EngineConfig,
    horizon: f32,
) -> usize {
    let scale = config.render_scale.max(1);
    let (width, height) = (surface.width(), surface.height() as f32);
    let mut hits = 0;

    for (column, hit) in caster.buffer().iter().enumerate() {
        if !hit.hit {
            continue;
        }
        hits += 1;

        let shade = 1.0 - fog_factor(hit.distance, config);
        let strip = textures
            .get_strip(hit.material_id, hit.distance, hit.side)
            .column(hit.wall_u);
        let texels = strip.len();
        let wall_height = caster.projected_height(hit.distance);
        let top = horizon - wall_height * 0.5;
        let y0 = top.max(0.0) as u32;
        let y1 = (top + wall_height).min(height).ceil().max(0.0) as u32;
        let x0 = column as u32 * scale;
        let x1 = (x0 + scale).min(width);

        let texel_at = |y: u32| {
            (((y as f32 + 0.5 - top) / wall_height * texels as f32) as usize).min(texels - 1)
        };
        let mut y = y0;
        while y < y1 {
            let v = texel_at(y);
            let mut end = y + 1;
            while end < y1 && texel_at(end) == v {
                end += 1;
            }
            let color = strip[v].scaled(shade);
            for x in x0..x1 {
                surface.fill_column(x, y, end, color);
            }
            y = end;
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Framebuffer;
    use duskcast_common::{Pose, Rgba};
    use duskcast_map::Map;

    const SENTINEL: Rgba = Rgba::rgb(255, 0, 255);

    /// Counts how a pass writes while forwarding to a framebuffer.
    struct Counting {
        fb: Framebuffer,
        puts: usize,
        fills: usize,
    }

    impl Surface for Counting {
        fn width(&self) -> u32 {
            self.fb.width()
        }
        fn height(&self) -> u32 {
            self.fb.height()
        }
        fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
            self.puts += 1;
            self.fb.put_pixel(x, y, color);
        }
        fn fill_column(&mut self, x: u32, y0: u32, y1: u32, color: Rgba) {
            self.fills += 1;
            self.fb.fill_column(x, y0, y1, color);
        }
    }

    fn cast_room(config: &EngineConfig, pose: Pose) -> (RayCaster, TextureCache) {
        let map = Map::bordered(4, 4).unwrap();
        let mut caster = RayCaster::new(&map, config).unwrap();
        caster.cast_all(&map, &pose, config.fov, config.column_count());
        (caster, TextureCache::with_default_textures(config))
    }

    #[test]
    fn horizon_follows_pitch() {
        assert_eq!(horizon(200, 0.0), 100.0);
        assert_eq!(horizon(200, 30.0), 130.0);
        assert_eq!(horizon(200, -500.0), 0.0);
    }

    #[test]
    fn fog_is_capped() {
        let config = EngineConfig::default();
        assert_eq!(fog_factor(0.0, &config), 0.0);
        assert!((fog_factor(10.0, &config) - 0.5).abs() < 1e-6);
        assert_eq!(fog_factor(1000.0, &config), config.darkness_cap);
    }

    #[test]
    fn background_gradient_endpoints() {
        let theme = Theme {
            ceiling: Rgba::rgb(100, 100, 100),
            floor: Rgba::rgb(80, 60, 40),
        };
        let mut fb = Framebuffer::new(2, 10);
        draw_background(&mut fb, theme, 5.0);
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::rgb(70, 70, 70)));
        assert_eq!(fb.get_pixel(1, 5), Some(Rgba::rgb(40, 20, 0)));
        let near = fb.get_pixel(0, 9).unwrap();
        assert!(near.r > 40 && near.r <= 80);
    }

    #[test]
    fn near_walls_are_filled_in_texel_runs() {
        let config = EngineConfig {
            screen_width: 8,
            screen_height: 256,
            ..EngineConfig::default()
        };
        // One tile from the wall the strip spans the whole screen.
        let (caster, textures) = cast_room(&config, Pose::new(2.0, 2.0, 0.0));
        let mut surface = Counting {
            fb: Framebuffer::new(8, 256),
            puts: 0,
            fills: 0,
        };
        surface.fb.clear(SENTINEL);
        let horizon = horizon(256, 0.0);
        let hits = draw_walls(&mut surface, &caster, &textures, &config, horizon);

        assert_eq!(hits, 8);
        assert_eq!(surface.puts, 0);
        assert!(surface.fills > 0 && surface.fills < 8 * 256, "{}", surface.fills);
        assert!(surface.fb.pixels().iter().all(|&c| c != SENTINEL));
    }

    #[test]
    fn trailing_partial_column_is_painted() {
        let config = EngineConfig {
            screen_width: 65,
            screen_height: 40,
            render_scale: 2,
            ..EngineConfig::default()
        };
        let (caster, textures) = cast_room(&config, Pose::new(2.0, 2.0, 0.3));
        assert_eq!(caster.buffer().len(), 33);

        let mut fb = Framebuffer::new(65, 40);
        fb.clear(SENTINEL);
        let horizon = horizon(40, 0.0);
        assert_eq!(draw_walls(&mut fb, &caster, &textures, &config, horizon), 33);
        for x in 0..65 {
            assert_ne!(fb.get_pixel(x, 20), Some(SENTINEL), "column {x}");
        }
    }
}
