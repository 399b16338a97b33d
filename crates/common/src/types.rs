use glam::Vec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entity indexed by the core.
///
/// Entities are owned by external game logic; the core only stores ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build an id from a raw value (replays, fixtures, deterministic tests).
    pub fn from_raw(raw: u128) -> Self {
        Self(Uuid::from_u128(raw))
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

/// Player pose in world units. Read-only to the core for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Yaw in radians, 0 faces +x, positive turns towards +y.
    pub angle: f32,
    /// Vertical horizon offset in pixels (view bob, look up/down).
    #[serde(default)]
    pub pitch: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle,
            pitch: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Unit vector the player is facing.
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}

/// Which family of wall face a ray hit.
///
/// `Vertical` faces run along the y axis (the ray crossed an x grid line),
/// `Horizontal` faces run along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Vertical,
    Horizontal,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Vertical, Side::Horizontal];

    pub fn index(self) -> usize {
        match self {
            Side::Vertical => 0,
            Side::Horizontal => 1,
        }
    }
}

/// 8-bit RGBA colour, laid out for direct upload as RGBA8 bytes.
#[repr(C)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const GRAY: Rgba = Rgba::rgb(128, 128, 128);
    pub const DARK_GRAY: Rgba = Rgba::rgb(40, 40, 40);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Multiply the colour channels by `factor` (clamped to 0..=1), keeping alpha.
    pub fn scaled(self, factor: f32) -> Self {
        let k = factor.clamp(0.0, 1.0);
        let mul = |v: u8| -> u8 { (v as f32 * k) as u8 };
        Self::new(mul(self.r), mul(self.g), mul(self.b), self.a)
    }

    /// Subtract `amount` from every colour channel, saturating at zero.
    pub fn darkened(self, amount: u8) -> Self {
        Self::new(
            self.r.saturating_sub(amount),
            self.g.saturating_sub(amount),
            self.b.saturating_sub(amount),
            self.a,
        )
    }

    /// Linear blend from `self` towards `other` by `t` (clamped to 0..=1).
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |x: u8, y: u8| -> u8 { ((x as f32) * (1.0 - t) + (y as f32) * t) as u8 };
        Self::new(
            f(self.r, other.r),
            f(self.g, other.g),
            f(self.b, other.b),
            f(self.a, other.a),
        )
    }
}
