//! Asteroids and the splitting rule

use glam::Vec2;
use rand_pcg::Pcg32;

use super::entity::{AssetManifest, Entity, EntityId, EntityKind, SpawnContext, Spawnable, TickContext};
use super::error::SimError;
use super::group::EntityGroup;
use crate::engine::{Body, VisualHandle};
use crate::random::random_integer;

/// A drifting rock; higher levels are smaller and faster
#[derive(Debug, Clone)]
pub struct Asteroid {
    id: EntityId,
    visual: VisualHandle,
    body: Body,
    level: u8,
}

/// Arguments for spawning one asteroid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsteroidSpawn {
    pub position: Vec2,
    pub level: u8,
    /// Random velocity when None
    pub velocity: Option<Vec2>,
}

/// Result of destroying an asteroid
#[derive(Debug, Clone, PartialEq)]
pub struct AsteroidDestroyed {
    pub id: EntityId,
    pub level: u8,
    /// Last known position
    pub position: Vec2,
    pub children: Vec<EntityId>,
}

impl Asteroid {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 3;
    pub const LEVEL_COUNT: usize = (Self::MAX_LEVEL - Self::MIN_LEVEL + 1) as usize;
    pub const MIN_BASE_VELOCITY: i32 = 10;
    pub const MAX_BASE_VELOCITY: i32 = 100;
    /// Degrees per second
    pub const MIN_BASE_ANGULAR_VELOCITY: i32 = 50;
    pub const MAX_BASE_ANGULAR_VELOCITY: i32 = 100;

    /// Reject levels outside [MIN_LEVEL, MAX_LEVEL]
    pub fn check_level(level: u8) -> Result<(), SimError> {
        if (Self::MIN_LEVEL..=Self::MAX_LEVEL).contains(&level) {
            Ok(())
        } else {
            Err(SimError::InvalidLevel {
                kind: EntityKind::Asteroid,
                level,
                min: Self::MIN_LEVEL,
                max: Self::MAX_LEVEL,
            })
        }
    }

    pub fn level_multiplier_for(level: u8) -> i32 {
        i32::from(level) - i32::from(Self::MIN_LEVEL) + 1
    }

    pub fn level_multiplier(&self) -> i32 {
        Self::level_multiplier_for(self.level)
    }

    /// One signed velocity component in ±[MIN, MAX] * multiplier
    pub fn random_velocity_component(rng: &mut Pcg32, multiplier: i32) -> f32 {
        random_integer(
            rng,
            Self::MIN_BASE_VELOCITY * multiplier,
            Self::MAX_BASE_VELOCITY * multiplier,
            true,
        ) as f32
    }

    pub fn random_velocity(rng: &mut Pcg32, multiplier: i32) -> Vec2 {
        let x = Self::random_velocity_component(rng, multiplier);
        let y = Self::random_velocity_component(rng, multiplier);
        Vec2::new(x, y)
    }
}

impl Entity for Asteroid {
    const KIND: EntityKind = EntityKind::Asteroid;

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

    fn tick(&mut self, _ctx: &mut TickContext<'_>) {
        // Drift and wrap are integrated by the engine
    }

    fn level(&self) -> Option<u8> {
        Some(self.level)
    }
}

impl Spawnable for Asteroid {
    type Args = AsteroidSpawn;

    fn preload(manifest: &mut AssetManifest) {
        for level in Self::MIN_LEVEL..=Self::MAX_LEVEL {
            let key = format!("asteroid_{level:02}");
            let path = format!("assets/sprites/{key}.png");
            manifest.image(key, path);
        }
    }

    fn build(id: EntityId, args: AsteroidSpawn, rng: &mut Pcg32) -> Result<Self, SimError> {
        Self::check_level(args.level)?;
        let multiplier = Self::level_multiplier_for(args.level);
        let spin = random_integer(
            rng,
            Self::MIN_BASE_ANGULAR_VELOCITY,
            Self::MAX_BASE_ANGULAR_VELOCITY,
            true,
        );
        let velocity = match args.velocity {
            Some(velocity) => velocity,
            None => Self::random_velocity(rng, multiplier),
        };

        Ok(Self {
            id,
            visual: VisualHandle::DETACHED,
            body: Body {
                position: args.position,
                velocity,
                angle: 0.0,
                angular_velocity: ((multiplier * spin) as f32).to_radians(),
            },
            level: args.level,
        })
    }

    fn visual_key(&self) -> &'static str {
        match self.level {
            1 => "asteroid_01",
            2 => "asteroid_02",
            _ => "asteroid_03",
        }
    }

    fn attach_visual(&mut self, visual: VisualHandle) {
        self.visual = visual;
    }
}

impl EntityGroup<Asteroid> {
    /// Remove an asteroid and split it into two mirrored children one level up
    ///
    /// Children share the parent's last known position and move with `v`
    /// and `-v`. A MAX_LEVEL asteroid leaves no children.
    pub fn destroy(
        &mut self,
        cx: &mut SpawnContext<'_>,
        id: EntityId,
    ) -> Result<AsteroidDestroyed, SimError> {
        let parent = self.remove(cx.engine, id)?;
        let position = parent.body.position;
        let child_level = parent.level + 1;

        let mut children = Vec::new();
        if child_level <= Asteroid::MAX_LEVEL {
            let velocity = Asteroid::random_velocity(cx.rng, Asteroid::level_multiplier_for(child_level));
            for v in [velocity, -velocity] {
                let child = self.spawn_one(
                    cx,
                    AsteroidSpawn {
                        position,
                        level: child_level,
                        velocity: Some(v),
                    },
                )?;
                children.push(child);
            }
        }

        Ok(AsteroidDestroyed {
            id,
            level: parent.level,
            position,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Bounds, GroupTag, HeadlessEngine};
    use crate::sim::entity::IdAllocator;
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Fixture {
        engine: HeadlessEngine,
        rng: Pcg32,
        ids: IdAllocator,
        group: EntityGroup<Asteroid>,
    }

    impl Fixture {
        fn new(seed: u64) -> Self {
            Self {
                engine: HeadlessEngine::new(Bounds::new(800.0, 600.0)),
                rng: Pcg32::seed_from_u64(seed),
                ids: IdAllocator::default(),
                group: EntityGroup::new(GroupTag::Asteroids),
            }
        }

        fn spawn(&mut self, position: Vec2, level: u8) -> Result<EntityId, SimError> {
            let mut cx = SpawnContext {
                engine: &mut self.engine,
                rng: &mut self.rng,
                ids: &mut self.ids,
            };
            self.group.spawn_one(&mut cx, AsteroidSpawn { position, level, velocity: None })
        }

        fn destroy(&mut self, id: EntityId) -> AsteroidDestroyed {
            let mut cx = SpawnContext {
                engine: &mut self.engine,
                rng: &mut self.rng,
                ids: &mut self.ids,
            };
            self.group.destroy(&mut cx, id).unwrap()
        }
    }

    #[test]
    fn test_invalid_levels_rejected() {
        let mut fx = Fixture::new(1);
        for level in [0, 4, 200] {
            let err = fx.spawn(Vec2::ZERO, level).unwrap_err();
            assert!(matches!(err, SimError::InvalidLevel { level: l, .. } if l == level));
        }
        assert!(fx.group.is_empty());
        assert_eq!(fx.engine.count(GroupTag::Asteroids), 0);
    }

    #[test]
    fn test_level_multiplier() {
        assert_eq!(Asteroid::level_multiplier_for(1), 1);
        assert_eq!(Asteroid::level_multiplier_for(3), 3);
    }

    #[test]
    fn test_velocity_scales_with_level() {
        let mut fx = Fixture::new(5);
        for _ in 0..50 {
            let id = fx.spawn(Vec2::new(100.0, 100.0), 3).unwrap();
            let body = *fx.group.get(id).unwrap().body();
            assert!((30.0..=300.0).contains(&body.velocity.x.abs()));
            assert!((30.0..=300.0).contains(&body.velocity.y.abs()));
            let spin = body.angular_velocity.to_degrees().abs();
            assert!((149.0..=301.0).contains(&spin));
        }
    }

    #[test]
    fn test_split_spawns_mirrored_children_at_parent() {
        let mut fx = Fixture::new(11);
        let parent = fx.spawn(Vec2::new(300.0, 200.0), 1).unwrap();
        let visual = fx.group.get(parent).unwrap().visual();
        fx.engine.set_position(visual, Vec2::new(320.0, 210.0));

        let destroyed = fx.destroy(parent);
        assert_eq!(destroyed.level, 1);
        assert_eq!(destroyed.position, Vec2::new(320.0, 210.0));
        assert_eq!(destroyed.children.len(), 2);
        assert!(!fx.group.contains(parent));

        let a = fx.group.get(destroyed.children[0]).unwrap();
        let b = fx.group.get(destroyed.children[1]).unwrap();
        assert_eq!(a.level, 2);
        assert_eq!(b.level, 2);
        assert_eq!(a.body.position, destroyed.position);
        assert_eq!(b.body.position, destroyed.position);
        assert_eq!(a.body.velocity, -b.body.velocity);
        assert!((20.0..=200.0).contains(&a.body.velocity.x.abs()));
    }

    #[test]
    fn test_max_level_leaves_no_children() {
        let mut fx = Fixture::new(11);
        let id = fx.spawn(Vec2::new(10.0, 10.0), Asteroid::MAX_LEVEL).unwrap();
        let destroyed = fx.destroy(id);
        assert!(destroyed.children.is_empty());
        assert!(fx.group.is_empty());
    }

    #[test]
    fn test_full_lineage_is_bounded() {
        let mut fx = Fixture::new(2);
        fx.spawn(Vec2::new(400.0, 300.0), Asteroid::MIN_LEVEL).unwrap();
        let mut destroyed = 0;
        while let Some(id) = fx.group.ids().first().copied() {
            fx.destroy(id);
            destroyed += 1;
        }
        // 1 + 2 + 4 asteroids over three levels
        assert_eq!(destroyed, 7);
    }

    proptest! {
        #[test]
        fn prop_split_law(seed in any::<u64>(), level in 1u8..=3) {
            let mut fx = Fixture::new(seed);
            let id = fx.spawn(Vec2::new(50.0, 60.0), level).unwrap();
            let destroyed = fx.destroy(id);
            if level < Asteroid::MAX_LEVEL {
                prop_assert_eq!(destroyed.children.len(), 2);
                let a = fx.group.get(destroyed.children[0]).unwrap();
                let b = fx.group.get(destroyed.children[1]).unwrap();
                prop_assert_eq!(a.level, level + 1);
                prop_assert_eq!(a.body.velocity, -b.body.velocity);
                prop_assert_eq!(a.body.position, Vec2::new(50.0, 60.0));
            } else {
                prop_assert!(destroyed.children.is_empty());
            }
        }
    }
}
