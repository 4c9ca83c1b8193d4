//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Engine access only through the `Engine` trait

pub mod asteroid;
pub mod collision;
pub mod entity;
pub mod error;
pub mod explosion;
pub mod group;
pub mod player;
pub mod projectile;
pub mod saucer;
pub mod scheduler;
pub mod state;
pub mod tick;
pub mod wave;

pub use asteroid::{Asteroid, AsteroidDestroyed, AsteroidSpawn};
pub use collision::{EntityRef, resolve_collision};
pub use entity::{
    AssetEntry, AssetManifest, Command, Entity, EntityId, EntityKind, EntitySnapshot, Faction,
    Spawnable,
};
pub use error::SimError;
pub use explosion::{Explosion, ExplosionSpawn};
pub use group::EntityGroup;
pub use player::{Player, PlayerState};
pub use projectile::{Projectile, ProjectileSpawn};
pub use saucer::{Saucer, SaucerSpawn};
pub use scheduler::{Scheduler, Task};
pub use state::{GameEvent, GameState, WorldSnapshot};
pub use tick::{TickInput, tick};
pub use wave::{KeepoutZone, Placement, SpawnedWave, WavePlan, difficulty_multiplier, next_wave_size, plan_wave};
