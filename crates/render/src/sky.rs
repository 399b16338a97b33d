use duskcast_common::Rgba;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::surface::Surface;

const STAR_COLORS: [Rgba; 3] = [
    Rgba::rgb(255, 255, 255),
    Rgba::rgb(200, 200, 255),
    Rgba::rgb(255, 255, 200),
];
const MOON: Rgba = Rgba::rgb(220, 220, 200);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    x: u32,
    y: u32,
    radius: i32,
    color: Rgba,
}

/// Star field and crescent moon painted over the ceiling.
///
/// Stars live in screen space and scroll horizontally with the view angle,
/// wrapping at the screen edge. The moon scrolls at half the star rate. Both
/// follow pitch and are clipped at the horizon.
#[derive(Debug, Clone)]
pub(crate) struct Sky {
    width: u32,
    height: u32,
    stars: Vec<Star>,
}

impl Sky {
    pub(crate) fn new(width: u32, height: u32, count: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| Star {
                x: rng.gen_range(0..width.max(1)),
                y: rng.gen_range(0..=height / 2),
                radius: rng.gen_range(0.5f32..2.5) as i32,
                color: STAR_COLORS[rng.gen_range(0..STAR_COLORS.len())],
            })
            .collect();
        Self {
            width,
            height,
            stars,
        }
    }

    /// Pixels the star field has scrolled for a view angle.
    pub(crate) fn star_offset(&self, angle: f32) -> i64 {
        let per_radian = self.width as f32 / 6.0;
        ((angle * per_radian) as i64).rem_euclid(i64::from(self.width.max(1)))
    }

    /// Moon centre and radius in screen pixels.
    pub(crate) fn moon(&self, angle: f32, pitch: f32) -> (i64, i64, i64) {
        let w = i64::from(self.width);
        let drift = (angle * self.width as f32 / 12.0) as i64;
        let x = (w - w / 6 - drift).rem_euclid((2 * w).max(1)) - w / 2;
        let y = i64::from(self.height / 8) + pitch as i64;
        let radius = i64::from(self.height / 20).max(1);
        (x, y, radius)
    }

    pub(crate) fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        angle: f32,
        pitch: f32,
        horizon: f32,
        ceiling: Rgba,
    ) {
        self.draw_stars(surface, angle, pitch, horizon);
        self.draw_moon(surface, angle, pitch, horizon, ceiling);
    }

    fn draw_stars<S: Surface + ?Sized>(&self, surface: &mut S, angle: f32, pitch: f32, horizon: f32) {
        let horizon = horizon as i64;
        let w = i64::from(surface.width());
        if w == 0 || horizon <= 0 {
            return;
        }
        let offset = self.star_offset(angle);
        for star in &self.stars {
            let cx = i64::from(star.x) + offset;
            let cy = i64::from(star.y) + pitch as i64;
            if !(0..horizon).contains(&cy) {
                continue;
            }
            let r = i64::from(star.radius);
            for dy in -r..=r {
                let y = cy + dy;
                if !(0..horizon).contains(&y) {
                    continue;
                }
                for dx in -r..=r {
                    if dx * dx + dy * dy <= r * r {
                        surface.put_pixel((cx + dx).rem_euclid(w) as u32, y as u32, star.color);
                    }
                }
            }
        }
    }

    fn draw_moon<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        angle: f32,
        pitch: f32,
        horizon: f32,
        ceiling: Rgba,
    ) {
        let horizon = horizon as i64;
        let w = i64::from(surface.width());
        let (mx, my, r) = self.moon(angle, pitch);
        if mx <= -r || mx >= w + r || my - r >= horizon {
            return;
        }
        // The shadow disc, offset left, leaves a crescent.
        let shadow_x = mx - r / 4 - 1;
        for y in (my - r).max(0)..(my + r + 1).min(horizon) {
            for x in (mx - r).max(0)..(mx + r + 1).min(w) {
                if (x - mx).pow(2) + (y - my).pow(2) > r * r {
                    continue;
                }
                let shadowed = (x - shadow_x).pow(2) + (y - my).pow(2) <= r * r;
                let color = if shadowed { ceiling } else { MOON };
                surface.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Framebuffer;

    fn lit_pixels(fb: &Framebuffer) -> usize {
        fb.pixels().iter().filter(|&&c| c != Rgba::BLACK).count()
    }

    #[test]
    fn stars_scroll_with_view_angle() {
        let sky = Sky::new(120, 80, 40, 7);
        assert_eq!(sky.star_offset(0.5), 10);

        let mut still = Framebuffer::new(120, 80);
        let mut turned = Framebuffer::new(120, 80);
        sky.draw_stars(&mut still, 0.0, 0.0, 40.0);
        sky.draw_stars(&mut turned, 0.5, 0.0, 40.0);
        assert!(lit_pixels(&still) > 0);
        assert_eq!(lit_pixels(&still), lit_pixels(&turned));
        for y in 0..80 {
            for x in 0..120 {
                assert_eq!(still.get_pixel(x, y), turned.get_pixel((x + 10) % 120, y), "({x}, {y})");
            }
        }
    }

    #[test]
    fn stars_stay_above_the_horizon() {
        let sky = Sky::new(120, 80, 100, 3);
        let mut fb = Framebuffer::new(120, 80);
        sky.draw_stars(&mut fb, 1.3, 0.0, 12.0);
        assert!(lit_pixels(&fb) > 0);
        for y in 12..80 {
            for x in 0..120 {
                assert_eq!(fb.get_pixel(x, y), Some(Rgba::BLACK));
            }
        }
    }

    #[test]
    fn moon_is_a_crescent_drifting_at_half_star_speed() {
        let sky = Sky::new(120, 80, 0, 1);
        assert_eq!(sky.moon(0.0, 0.0), (40, 10, 4));
        assert_eq!(sky.moon(0.5, 0.0).0, 35);
        assert_eq!(sky.moon(0.0, 6.0).1, 16);

        let ceiling = Rgba::rgb(1, 2, 3);
        let mut fb = Framebuffer::new(120, 80);
        sky.draw_moon(&mut fb, 0.0, 0.0, 40.0, ceiling);
        assert_eq!(fb.get_pixel(44, 10), Some(MOON));
        assert_eq!(fb.get_pixel(40, 10), Some(ceiling));
        assert_eq!(fb.get_pixel(36, 10), Some(ceiling));
        assert_eq!(fb.get_pixel(50, 10), Some(Rgba::BLACK));
    }

    #[test]
    fn moon_is_clipped_at_the_horizon() {
        let sky = Sky::new(120, 80, 0, 1);
        let mut fb = Framebuffer::new(120, 80);
        sky.draw_moon(&mut fb, 0.0, 0.0, 8.0, Rgba::rgb(1, 2, 3));
        assert_eq!(fb.get_pixel(42, 7), Some(MOON));
        for y in 8..80 {
            for x in 0..120 {
                assert_eq!(fb.get_pixel(x, y), Some(Rgba::BLACK));
            }
        }
    }
}
