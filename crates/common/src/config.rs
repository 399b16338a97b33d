use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::Rgba;

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Floor and ceiling colours for one level theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub ceiling: Rgba,
    pub floor: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            ceiling: Rgba::GRAY,
            floor: Rgba::DARK_GRAY,
        }
    }
}

/// Construction-time configuration for the caster, renderer and spatial grid.
///
/// All values are fixed once a renderer is built; there is no runtime
/// reconfiguration. Angles are radians, lengths are world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of one map tile in world units.
    pub tile_size: f32,
    /// Horizontal field of view.
    pub fov: f32,
    /// Rays stop (and report a miss) beyond this distance.
    pub max_depth: f32,
    /// Upper bound of the distance darkening factor.
    pub darkness_cap: f32,
    /// Explicit projection constant. Derived from `vertical_fov` and
    /// `screen_height` when absent.
    pub projection_constant: Option<f32>,
    /// Vertical field of view, used to derive the projection constant.
    pub vertical_fov: f32,
    /// Spatial grid cell edge length.
    pub cell_size: f32,
    pub screen_width: u32,
    pub screen_height: u32,
    /// Each cast column covers this many screen pixels.
    pub render_scale: u32,
    /// FOV multiplier while zoomed.
    pub zoom_fov_mult: f32,
    /// Extra angle beyond half the FOV within which sprites are kept.
    pub sprite_margin: f32,
    /// Number of distance buckets in the texture cache.
    pub distance_buckets: usize,
    /// Brightness multiplier for horizontal faces.
    pub side_tint: f32,
    /// Distance at which cached wall shading reaches its floor.
    pub shade_falloff: f32,
    pub themes: Vec<Theme>,
    /// Stars in the sky layer above the horizon.
    pub star_count: usize,
    /// Seed for star placement.
    pub sky_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            fov: std::f32::consts::FRAC_PI_3,
            max_depth: 20.0,
            darkness_cap: 0.85,
            projection_constant: None,
            // tan(vfov / 2) = 0.5 gives a projection constant equal to the
            // screen height: a tile at distance 1 fills the screen.
            vertical_fov: 2.0 * 0.5f32.atan(),
            cell_size: 5.0,
            screen_width: 320,
            screen_height: 200,
            render_scale: 1,
            zoom_fov_mult: 0.5,
            sprite_margin: 0.5,
            distance_buckets: 8,
            side_tint: 0.7,
            shade_falloff: 50.0,
            themes: Vec::new(),
            star_count: 100,
            sky_seed: 0x5eed_5ca1,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would make projection or bucketing meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {v}"),
                })
            }
        };
        positive("tile_size", self.tile_size)?;
        positive("fov", self.fov)?;
        positive("max_depth", self.max_depth)?;
        positive("vertical_fov", self.vertical_fov)?;
        positive("cell_size", self.cell_size)?;
        positive("zoom_fov_mult", self.zoom_fov_mult)?;
        positive("shade_falloff", self.shade_falloff)?;
        if let Some(k) = self.projection_constant {
            positive("projection_constant", k)?;
        }
        if self.fov >= std::f32::consts::PI {
            return Err(ConfigError::Invalid {
                field: "fov",
                reason: "must be below pi".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.darkness_cap) {
            return Err(ConfigError::Invalid {
                field: "darkness_cap",
                reason: format!("must be within 0..=1, got {}", self.darkness_cap),
            });
        }
        if !(0.0..=1.0).contains(&self.side_tint) {
            return Err(ConfigError::Invalid {
                field: "side_tint",
                reason: format!("must be within 0..=1, got {}", self.side_tint),
            });
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(ConfigError::Invalid {
                field: "screen_width",
                reason: "screen must have a non-zero area".into(),
            });
        }
        if self.render_scale == 0 {
            return Err(ConfigError::Invalid {
                field: "render_scale",
                reason: "must be at least 1".into(),
            });
        }
        if self.distance_buckets == 0 {
            return Err(ConfigError::Invalid {
                field: "distance_buckets",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Scale factor turning `tile_size / distance` into pixels.
    pub fn projection_constant(&self) -> f32 {
        self.projection_constant.unwrap_or_else(|| {
            (self.screen_height as f32 * 0.5) / (self.vertical_fov * 0.5).tan()
        })
    }

    /// Number of rays cast per frame.
    ///
    /// A trailing partial column is included when `screen_width` is not a
    /// multiple of `render_scale`.
    pub fn column_count(&self) -> usize {
        self.screen_width.div_ceil(self.render_scale.max(1)).max(1) as usize
    }

    /// Field of view in effect, optionally zoomed.
    pub fn effective_fov(&self, zoomed: bool) -> f32 {
        if zoomed {
            self.fov * self.zoom_fov_mult
        } else {
            self.fov
        }
    }

    /// Theme for a map theme index, wrapping around the configured list.
    pub fn theme(&self, index: u8) -> Theme {
        if self.themes.is_empty() {
            Theme::default()
        } else {
            self.themes[index as usize % self.themes.len()]
        }
    }
}
