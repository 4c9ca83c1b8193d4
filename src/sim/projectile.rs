//! Projectiles fired by the player and saucers

use glam::Vec2;
use rand_pcg::Pcg32;

use super::entity::{AssetManifest, Entity, EntityId, EntityKind, Faction, Spawnable, TickContext};
use super::error::SimError;
use crate::engine::{Body, VisualHandle};
use crate::velocity_from_rotation;

/// A shot travelling at fixed speed until its lifespan ends or it hits something
#[derive(Debug, Clone)]
pub struct Projectile {
    id: EntityId,
    visual: VisualHandle,
    body: Body,
    faction: Faction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub origin: Vec2,
    /// Heading (radians)
    pub angle: f32,
    pub faction: Faction,
}

impl Projectile {
    /// Time to live
    pub const LIFESPAN_MS: u64 = 2000;
    pub const VELOCITY: f32 = 500.0;

    pub fn faction(&self) -> Faction {
        self.faction
    }
}

impl Entity for Projectile {
    const KIND: EntityKind = EntityKind::Projectile;

    fn id(&self) -> EntityId {
        self.id
    }

    fn visual(&self) -> VisualHandle {
        self.visual
    }

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn tick(&mut self, _ctx: &mut TickContext<'_>) {}
}

impl Spawnable for Projectile {
    type Args = ProjectileSpawn;

    fn preload(manifest: &mut AssetManifest) {
        manifest.image("projectile", "assets/sprites/projectile.png");
    }

    fn build(id: EntityId, args: ProjectileSpawn, _rng: &mut Pcg32) -> Result<Self, SimError> {
        Ok(Self {
            id,
            visual: VisualHandle::DETACHED,
            body: Body {
                position: args.origin,
                velocity: velocity_from_rotation(args.angle, Self::VELOCITY),
                angle: args.angle,
                angular_velocity: 0.0,
            },
            faction: args.faction,
        })
    }

    fn visual_key(&self) -> &'static str {
        "projectile"
    }

    fn attach_visual(&mut self, visual: VisualHandle) {
        self.visual = visual;
    }
}
