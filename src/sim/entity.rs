//! Entity abstractions shared by every simulated object
//!
//! `Entity` is sealed: the only implementors are the five kinds in this
//! module tree. `Spawnable` is what an `EntityGroup` needs to create members.

use std::fmt;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::SimError;
use super::scheduler::Task;
use super::tick::TickInput;
use crate::engine::{Body, Engine, VisualHandle};

/// Unique entity identifier (never reused within a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Asteroid,
    Saucer,
    Projectile,
    Explosion,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Asteroid => "asteroid",
            EntityKind::Saucer => "saucer",
            EntityKind::Projectile => "projectile",
            EntityKind::Explosion => "explosion",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocates entity ids for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Work an entity asks the world to do after the group tick
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FireProjectile {
        faction: Faction,
        origin: Vec2,
        angle: f32,
    },
    Schedule { delay_ms: u64, task: Task },
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Saucer,
}

/// Per-tick view handed to `Entity::tick`
pub struct TickContext<'a> {
    pub input: &'a TickInput,
    pub engine: &'a mut dyn Engine,
    pub commands: &'a mut Vec<Command>,
}

/// Resources needed to bring a new entity into the world
pub struct SpawnContext<'a> {
    pub engine: &'a mut dyn Engine,
    pub rng: &'a mut Pcg32,
    pub ids: &'a mut IdAllocator,
}

/// Asset an entity kind needs before it can be shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetEntry {
    Image {
        key: String,
        path: String,
    },
    Spritesheet {
        key: String,
        path: String,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Assets collected by every kind's `preload`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    pub entries: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn image(&mut self, key: impl Into<String>, path: impl Into<String>) {
        self.entries.push(AssetEntry::Image {
            key: key.into(),
            path: path.into(),
        });
    }

    pub fn spritesheet(
        &mut self,
        key: impl Into<String>,
        path: impl Into<String>,
        frame_width: u32,
        frame_height: u32,
    ) {
        self.entries.push(AssetEntry::Spritesheet {
            key: key.into(),
            path: path.into(),
            frame_width,
            frame_height,
        });
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| match entry {
            AssetEntry::Image { key: k, .. } | AssetEntry::Spritesheet { key: k, .. } => k == key,
        })
    }
}

/// Renderable summary of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub level: Option<u8>,
    pub visual: VisualHandle,
    pub body: Body,
}

mod private {
    pub trait Sealed {}

    impl Sealed for super::super::asteroid::Asteroid {}
    impl Sealed for super::super::saucer::Saucer {}
    impl Sealed for super::super::projectile::Projectile {}
    impl Sealed for super::super::explosion::Explosion {}
    impl Sealed for super::super::player::Player {}
}

/// Common interface of every simulated object
pub trait Entity: private::Sealed {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
    fn visual(&self) -> VisualHandle;
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Advance behavior by one tick. Reads/writes only its own state and
    /// emits commands.
    fn tick(&mut self, ctx: &mut TickContext<'_>);

    fn level(&self) -> Option<u8> {
        None
    }

    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id(),
            kind: Self::KIND,
            level: self.level(),
            visual: self.visual(),
            body: *self.body(),
        }
    }
}

/// Entity kinds an `EntityGroup` can create
pub trait Spawnable: Entity + Sized {
    type Args;

    /// Register the assets this kind needs
    fn preload(manifest: &mut AssetManifest);

    /// Build the entity (visual not yet attached)
    fn build(id: EntityId, args: Self::Args, rng: &mut Pcg32) -> Result<Self, SimError>;

    /// Asset key for this instance's visual
    fn visual_key(&self) -> &'static str;

    fn attach_visual(&mut self, visual: VisualHandle);
}
