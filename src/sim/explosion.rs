//! Explosion effects spawned where two entities collide

use glam::Vec2;
use rand_pcg::Pcg32;

use super::entity::{AssetManifest, Entity, EntityId, EntityKind, Spawnable, TickContext};
use super::error::SimError;
use crate::engine::{Body, VisualHandle};

#[derive(Debug, Clone)]
pub struct Explosion {
    id: EntityId,
    visual: VisualHandle,
    body: Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionSpawn {
    pub position: Vec2,
}

impl Explosion {
    pub const SPRITESHEET_FRAMES: u64 = 12;
    pub const FRAME_RATE: u64 = 12;

    /// Time until the animation completes and the explosion is removed
    pub const fn lifetime_ms() -> u64 {
        Self::SPRITESHEET_FRAMES * 1000 / Self::FRAME_RATE
    }
}

impl Entity for Explosion {
    const KIND: EntityKind = EntityKind::Explosion;

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

impl Spawnable for Explosion {
    type Args = ExplosionSpawn;

    fn preload(manifest: &mut AssetManifest) {
        manifest.spritesheet(
            "explosion-spritesheet",
            "assets/sprites/explosion-spritesheet.png",
            32,
            32,
        );
    }

    fn build(id: EntityId, args: ExplosionSpawn, _rng: &mut Pcg32) -> Result<Self, SimError> {
        Ok(Self {
            id,
            visual: VisualHandle::DETACHED,
            body: Body::at(args.position),
        })
    }

    fn visual_key(&self) -> &'static str {
        "explosion-spritesheet"
    }

    fn attach_visual(&mut self, visual: VisualHandle) {
        self.visual = visual;
    }
}
