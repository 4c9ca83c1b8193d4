//! Asteroid wave placement and difficulty scaling
//!
//! Positions are rejection-sampled so no asteroid lands inside a keepout
//! zone: the player's zone or the zone of an asteroid placed earlier in the
//! same wave. Sampling is capped; when the cap is hit the candidate with the
//! most clearance is accepted and the placement is flagged as overlapping.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidSpawn};
use super::entity::{EntityId, SpawnContext};
use super::error::SimError;
use super::group::EntityGroup;
use crate::engine::Bounds;
use crate::random::random_integer;

/// Circular region new asteroids may not be placed in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeepoutZone {
    center: Vec2,
    radius: f32,
}

impl KeepoutZone {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Boundary counts as inside
    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// Distance from `point` to the zone edge (negative inside)
    pub fn clearance(&self, point: Vec2) -> f32 {
        self.center.distance(point) - self.radius
    }
}

/// Where and at what level one asteroid of a wave goes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec2,
    pub level: u8,
    /// Sampling was exhausted and this placement overlaps an earlier zone
    pub overlapping: bool,
}

/// Full placement for one wave
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WavePlan {
    pub placements: Vec<Placement>,
    /// Every zone active at the end of planning (initial zones first)
    pub zones: Vec<KeepoutZone>,
}

impl WavePlan {
    /// Placements that had to accept overlap
    pub fn fallbacks(&self) -> usize {
        self.placements.iter().filter(|p| p.overlapping).count()
    }
}

/// A wave that has been placed and spawned
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedWave {
    pub ids: Vec<EntityId>,
    pub plan: WavePlan,
}

fn sample_position(rng: &mut Pcg32, bounds: Bounds) -> Vec2 {
    let x = random_integer(rng, 0, bounds.width as i32, false);
    let y = random_integer(rng, 0, bounds.height as i32, false);
    Vec2::new(x as f32, y as f32)
}

/// Smallest clearance to any zone (infinite when there are none)
fn clearance(zones: &[KeepoutZone], point: Vec2) -> f32 {
    zones
        .iter()
        .map(|zone| zone.clearance(point))
        .fold(f32::INFINITY, f32::min)
}

/// Place `count` asteroids outside every zone active at their placement time
pub fn plan_wave(
    rng: &mut Pcg32,
    bounds: Bounds,
    count: u32,
    radii: &[f32; Asteroid::LEVEL_COUNT],
    zones: Vec<KeepoutZone>,
    max_attempts: u32,
) -> WavePlan {
    let mut zones = zones;
    let mut placements = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let mut chosen = None;
        let mut best: Option<(Vec2, f32)> = None;

        for _ in 0..max_attempts.max(1) {
            let candidate = sample_position(rng, bounds);
            if !zones.iter().any(|zone| zone.contains(candidate)) {
                chosen = Some(candidate);
                break;
            }
            let room = clearance(&zones, candidate);
            if best.is_none_or(|(_, best_room)| room > best_room) {
                best = Some((candidate, room));
            }
        }

        let (position, overlapping) = match (chosen, best) {
            (Some(position), _) => (position, false),
            (None, Some((position, _))) => {
                log::warn!(
                    "Asteroid placement exhausted {} attempts, accepting overlap at ({}, {})",
                    max_attempts,
                    position.x,
                    position.y
                );
                (position, true)
            }
            // Unreachable: at least one attempt always runs
            (None, None) => (sample_position(rng, bounds), true),
        };

        let level = random_integer(
            rng,
            i32::from(Asteroid::MIN_LEVEL),
            i32::from(Asteroid::MAX_LEVEL),
            false,
        ) as u8;
        let radius = radii[usize::from(level - Asteroid::MIN_LEVEL)];
        zones.push(KeepoutZone::new(position, radius));
        placements.push(Placement {
            position,
            level,
            overlapping,
        });
    }

    WavePlan { placements, zones }
}

impl EntityGroup<Asteroid> {
    /// Plan a wave and spawn every asteroid in it
    pub fn spawn_multiple(
        &mut self,
        cx: &mut SpawnContext<'_>,
        count: u32,
        radii: &[f32; Asteroid::LEVEL_COUNT],
        zones: Vec<KeepoutZone>,
        max_attempts: u32,
    ) -> Result<SpawnedWave, SimError> {
        let bounds = cx.engine.world_bounds();
        let plan = plan_wave(cx.rng, bounds, count, radii, zones, max_attempts);

        let mut ids = Vec::with_capacity(plan.placements.len());
        for placement in &plan.placements {
            let id = self.spawn_one(
                cx,
                AsteroidSpawn {
                    position: placement.position,
                    level: placement.level,
                    velocity: None,
                },
            )?;
            ids.push(id);
        }
        Ok(SpawnedWave { ids, plan })
    }
}

/// Wave growth factor: 1 + score / increment
pub fn difficulty_multiplier(score: u64, increment: u64) -> f32 {
    1.0 + score as f32 / increment.max(1) as f32
}

/// Size of the wave following one of `previous` asteroids
pub fn next_wave_size(previous: u32, score: u64, increment: u64, max_wave_size: u32) -> u32 {
    let scaled = (previous as f32 * difficulty_multiplier(score, increment)).ceil() as u32;
    scaled.clamp(1, max_wave_size.max(1))
}
