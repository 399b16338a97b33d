use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use duskcast_common::{EntityId, Rgba};
use glam::Vec2;

/// Sprite id with no atlas image; such billboards draw as a tinted disc.
pub const UNTEXTURED: u32 = u32::MAX;

/// Anything the billboard pass can draw.
///
/// Positions and radii are world units. `elevation` is the height of the
/// sprite centre as a fraction of a wall, where 0.5 is eye level.
pub trait Billboard {
    fn id(&self) -> EntityId;
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
    fn sprite_id(&self) -> u32;

    fn scale(&self) -> f32 {
        1.0
    }

    fn elevation(&self) -> f32 {
        0.5
    }

    /// Colour used when the sprite id has no atlas image.
    fn tint(&self) -> Rgba {
        Rgba::WHITE
    }
}

/// An enemy or pickup drawn from the sprite atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotSprite {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub sprite_id: u32,
    pub scale: f32,
    pub tint: Rgba,
}

impl BotSprite {
    pub fn new(id: EntityId, position: Vec2, radius: f32, sprite_id: u32) -> Self {
        Self {
            id,
            position,
            radius,
            sprite_id,
            scale: 1.0,
            tint: Rgba::rgb(255, 80, 80),
        }
    }

    pub fn with_scale(self, scale: f32) -> Self {
        Self { scale, ..self }
    }
}

impl Billboard for BotSprite {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> Vec2 {
        self.position
    }
    fn radius(&self) -> f32 {
        self.radius
    }
    fn sprite_id(&self) -> u32 {
        self.sprite_id
    }
    fn scale(&self) -> f32 {
        self.scale
    }
    fn tint(&self) -> Rgba {
        self.tint
    }
}

/// A projectile in flight, at height `z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSprite {
    pub id: EntityId,
    pub position: Vec2,
    pub z: f32,
    pub radius: f32,
    pub color: Rgba,
    pub sprite_id: u32,
}

impl ProjectileSprite {
    pub fn new(id: EntityId, position: Vec2, z: f32, radius: f32, color: Rgba) -> Self {
        Self {
            id,
            position,
            z,
            radius,
            color,
            sprite_id: UNTEXTURED,
        }
    }
}

impl Billboard for ProjectileSprite {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> Vec2 {
        self.position
    }
    fn radius(&self) -> f32 {
        self.radius
    }
    fn sprite_id(&self) -> u32 {
        self.sprite_id
    }
    fn elevation(&self) -> f32 {
        self.z
    }
    fn tint(&self) -> Rgba {
        self.color
    }
}

/// A short-lived effect particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSprite {
    pub id: EntityId,
    pub position: Vec2,
    pub z: f32,
    pub size: f32,
    pub color: Rgba,
}

impl Billboard for ParticleSprite {
    fn id(&self) -> EntityId {
        self.id
    }
    fn position(&self) -> Vec2 {
        self.position
    }
    fn radius(&self) -> f32 {
        self.size * 0.5
    }
    fn sprite_id(&self) -> u32 {
        UNTEXTURED
    }
    fn elevation(&self) -> f32 {
        self.z
    }
    fn tint(&self) -> Rgba {
        self.color
    }
}

/// Any drawable scene object, for collections mixing the variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneObject {
    Bot(BotSprite),
    Projectile(ProjectileSprite),
    Particle(ParticleSprite),
}

impl SceneObject {
    fn inner(&self) -> &dyn Billboard {
        match self {
            SceneObject::Bot(b) => b,
            SceneObject::Projectile(p) => p,
            SceneObject::Particle(p) => p,
        }
    }
}

impl Billboard for SceneObject {
    fn id(&self) -> EntityId {
        self.inner().id()
    }
    fn position(&self) -> Vec2 {
        self.inner().position()
    }
    fn radius(&self) -> f32 {
        self.inner().radius()
    }
    fn sprite_id(&self) -> u32 {
        self.inner().sprite_id()
    }
    fn scale(&self) -> f32 {
        self.inner().scale()
    }
    fn elevation(&self) -> f32 {
        self.inner().elevation()
    }
    fn tint(&self) -> Rgba {
        self.inner().tint()
    }
}

impl From<BotSprite> for SceneObject {
    fn from(b: BotSprite) -> Self {
        SceneObject::Bot(b)
    }
}

impl From<ProjectileSprite> for SceneObject {
    fn from(p: ProjectileSprite) -> Self {
        SceneObject::Projectile(p)
    }
}

impl From<ParticleSprite> for SceneObject {
    fn from(p: ParticleSprite) -> Self {
        SceneObject::Particle(p)
    }
}

/// Resolves entity ids reported by the spatial grid to drawable objects.
pub trait EntityLookup {
    fn get(&self, id: EntityId) -> Option<&dyn Billboard>;
}

impl<B: Billboard, S: BuildHasher> EntityLookup for HashMap<EntityId, B, S> {
    fn get(&self, id: EntityId) -> Option<&dyn Billboard> {
        HashMap::get(self, &id).map(|b| b as &dyn Billboard)
    }
}

impl<B: Billboard> EntityLookup for BTreeMap<EntityId, B> {
    fn get(&self, id: EntityId) -> Option<&dyn Billboard> {
        BTreeMap::get(self, &id).map(|b| b as &dyn Billboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_object_delegates() {
        let id = EntityId::from_raw(1);
        let bot: SceneObject = BotSprite::new(id, Vec2::new(1.0, 2.0), 0.4, 3)
            .with_scale(2.0)
            .into();
        assert_eq!(bot.id(), id);
        assert_eq!(bot.sprite_id(), 3);
        assert_eq!(bot.scale(), 2.0);
        assert_eq!(bot.elevation(), 0.5);

        let shot: SceneObject =
            ProjectileSprite::new(id, Vec2::ZERO, 0.3, 0.1, Rgba::rgb(0, 255, 255)).into();
        assert_eq!(shot.sprite_id(), UNTEXTURED);
        assert_eq!(shot.elevation(), 0.3);
        assert_eq!(shot.tint(), Rgba::rgb(0, 255, 255));

        let spark: SceneObject = ParticleSprite {
            id,
            position: Vec2::ZERO,
            z: 0.7,
            size: 0.2,
            color: Rgba::WHITE,
        }
        .into();
        assert!((spark.radius() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn lookups_over_maps() {
        let a = EntityId::from_raw(1);
        let b = EntityId::from_raw(2);
        let mut hashed = HashMap::new();
        hashed.insert(a, BotSprite::new(a, Vec2::ONE, 0.5, 0));
        let mut ordered = BTreeMap::new();
        ordered.insert(b, SceneObject::from(BotSprite::new(b, Vec2::ONE, 0.5, 1)));

        assert_eq!(EntityLookup::get(&hashed, a).map(|x| x.sprite_id()), Some(0));
        assert!(EntityLookup::get(&hashed, b).is_none());
        assert_eq!(EntityLookup::get(&ordered, b).map(|x| x.sprite_id()), Some(1));
    }
}
