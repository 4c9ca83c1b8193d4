//! Enemy saucers
//!
//! Saucers drift, spin, and fire along their heading whenever their
//! cooldown allows. Higher levels fire faster.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::entity::{
    AssetManifest, Command, Entity, EntityId, EntityKind, Faction, Spawnable, TickContext,
};
use super::error::SimError;
use super::scheduler::Task;
use crate::engine::{Body, Bounds, VisualHandle};
use crate::random::{choose, random_integer};

#[derive(Debug, Clone)]
pub struct Saucer {
    id: EntityId,
    visual: VisualHandle,
    body: Body,
    level: u8,
    can_fire: bool,
}

/// Arguments for spawning one saucer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaucerSpawn {
    pub position: Vec2,
    pub level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Saucer {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 2;
    pub const MIN_BASE_VELOCITY: i32 = 100;
    pub const MAX_BASE_VELOCITY: i32 = 125;
    /// Degrees per second
    pub const MIN_BASE_ANGULAR_VELOCITY: i32 = 150;
    pub const MAX_BASE_ANGULAR_VELOCITY: i32 = 200;
    /// Shots per second at level multiplier 1
    pub const FIRE_RATE: f32 = 2.0;
    /// Largest distance outside the world edge a saucer appears at
    pub const MAX_EDGE_OFFSET: i32 = 32;

    pub fn check_level(level: u8) -> Result<(), SimError> {
        if (Self::MIN_LEVEL..=Self::MAX_LEVEL).contains(&level) {
            Ok(())
        } else {
            Err(SimError::InvalidLevel {
                kind: EntityKind::Saucer,
                level,
                min: Self::MIN_LEVEL,
                max: Self::MAX_LEVEL,
            })
        }
    }

    pub fn level_multiplier(&self) -> i32 {
        i32::from(self.level) - i32::from(Self::MIN_LEVEL) + 1
    }

    pub fn can_fire(&self) -> bool {
        self.can_fire
    }

    /// Cooldown between shots
    pub fn fire_cooldown_ms(&self) -> u64 {
        (1000.0 / (Self::FIRE_RATE * self.level_multiplier() as f32)) as u64
    }

    /// Re-arm after the cooldown task fires
    pub fn reload(&mut self) {
        self.can_fire = true;
    }

    /// Random spawn just outside one of the world edges, random level
    pub fn random_spawn(rng: &mut Pcg32, bounds: Bounds) -> SaucerSpawn {
        let edge = *choose(rng, &[Edge::Top, Edge::Bottom, Edge::Left, Edge::Right]).unwrap_or(&Edge::Top);
        let offset = random_integer(rng, 1, Self::MAX_EDGE_OFFSET, false) as f32;
        let x = random_integer(rng, 0, bounds.width as i32, false) as f32;
        let y = random_integer(rng, 0, bounds.height as i32, false) as f32;
        let position = match edge {
            Edge::Top => Vec2::new(x, -offset),
            Edge::Bottom => Vec2::new(x, bounds.height + offset),
            Edge::Left => Vec2::new(-offset, y),
            Edge::Right => Vec2::new(bounds.width + offset, y),
        };
        let level = random_integer(rng, i32::from(Self::MIN_LEVEL), i32::from(Self::MAX_LEVEL), false) as u8;
        SaucerSpawn { position, level }
    }
}

impl Entity for Saucer {
    const KIND: EntityKind = EntityKind::Saucer;

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

    fn tick(&mut self, ctx: &mut TickContext<'_>) {
        if !self.can_fire {
            return;
        }
        ctx.commands.push(Command::FireProjectile {
            faction: Faction::Saucer,
            origin: self.body.position,
            angle: self.body.angle,
        });
        self.can_fire = false;
        ctx.commands.push(Command::Schedule {
            delay_ms: self.fire_cooldown_ms(),
            task: Task::SaucerFireReady(self.id),
        });
    }

    fn level(&self) -> Option<u8> {
        Some(self.level)
    }
}

impl Spawnable for Saucer {
    type Args = SaucerSpawn;

    fn preload(manifest: &mut AssetManifest) {
        for level in Self::MIN_LEVEL..=Self::MAX_LEVEL {
            let key = format!("saucer_{level:02}");
            let path = format!("assets/sprites/{key}.png");
            manifest.image(key, path);
        }
    }

    fn build(id: EntityId, args: SaucerSpawn, rng: &mut Pcg32) -> Result<Self, SimError> {
        Self::check_level(args.level)?;
        let multiplier = i32::from(args.level) - i32::from(Self::MIN_LEVEL) + 1;
        let vx = multiplier * random_integer(rng, Self::MIN_BASE_VELOCITY, Self::MAX_BASE_VELOCITY, true);
        let vy = multiplier * random_integer(rng, Self::MIN_BASE_VELOCITY, Self::MAX_BASE_VELOCITY, true);
        let spin = multiplier
            * random_integer(
                rng,
                Self::MIN_BASE_ANGULAR_VELOCITY,
                Self::MAX_BASE_ANGULAR_VELOCITY,
                true,
            );

        Ok(Self {
            id,
            visual: VisualHandle::DETACHED,
            body: Body {
                position: args.position,
                velocity: Vec2::new(vx as f32, vy as f32),
                angle: 0.0,
                angular_velocity: (spin as f32).to_radians(),
            },
            level: args.level,
            can_fire: true,
        })
    }

    fn visual_key(&self) -> &'static str {
        match self.level {
            1 => "saucer_01",
            _ => "saucer_02",
        }
    }

    fn attach_visual(&mut self, visual: VisualHandle) {
        self.visual = visual;
    }
}
