//! Game state and spawn orchestration
//!
//! `GameState` owns every entity group, the player, the task scheduler and
//! the run's RNG. All spawning and destruction funnels through here so that
//! group membership, scheduled follow-ups and scoring stay consistent.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidDestroyed, AsteroidSpawn};
use super::entity::{
    AssetManifest, Command, Entity, EntityId, EntityKind, EntitySnapshot, Faction, IdAllocator,
    SpawnContext,
};
use super::error::SimError;
use super::explosion::{Explosion, ExplosionSpawn};
use super::group::EntityGroup;
use super::player::{Player, PlayerState};
use super::projectile::{Projectile, ProjectileSpawn};
use super::saucer::{Saucer, SaucerSpawn};
use super::scheduler::{Scheduler, Task};
use super::wave::{KeepoutZone, next_wave_size};
use crate::config::GameConfig;
use crate::engine::{Engine, GroupTag};

/// Gameplay notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveRequested { wave: u32, count: u32 },
    WaveSpawned { wave: u32, count: u32, fallbacks: u32 },
    /// Some asteroids of a wave had to be placed inside a keepout zone
    PlacementFallback { wave: u32, overlapping: u32 },
    AsteroidDestroyed { id: EntityId, level: u8, children: u32 },
    SaucerSpawned { id: EntityId, level: u8 },
    SaucerDestroyed { id: EntityId, level: u8 },
    ScoreAwarded { kind: EntityKind, points: u64, total: u64 },
    ExtraLife { lives: u32 },
    PlayerSpawned { invincible: bool },
    PlayerDied { lives_left: u32 },
    GameOver { score: u64 },
}

/// Everything the presentation layer needs to draw a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time_ms: u64,
    pub score: u64,
    pub lives: u32,
    pub wave: u32,
    pub game_over: bool,
    pub player_state: PlayerState,
    pub player: Option<EntitySnapshot>,
    pub asteroids: Vec<EntitySnapshot>,
    pub saucers: Vec<EntitySnapshot>,
    pub player_projectiles: Vec<EntitySnapshot>,
    pub saucer_projectiles: Vec<EntitySnapshot>,
    pub explosions: Vec<EntitySnapshot>,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) rng: Pcg32,
    pub(crate) ids: IdAllocator,
    pub(crate) scheduler: Scheduler,
    pub(crate) player: Player,
    pub(crate) asteroids: EntityGroup<Asteroid>,
    pub(crate) saucers: EntityGroup<Saucer>,
    pub(crate) player_projectiles: EntityGroup<Projectile>,
    pub(crate) saucer_projectiles: EntityGroup<Projectile>,
    pub(crate) explosions: EntityGroup<Explosion>,
    /// Waves spawned so far
    pub(crate) wave_index: u32,
    /// Size of the most recently requested wave
    pub(crate) wave_size: u32,
    /// A wave is telegraphed but not yet placed
    pub(crate) wave_pending: bool,
    pub(crate) time_ticks: u64,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) started: bool,
}

impl GameState {
    /// Create a new game state; `config` is expected to be validated
    pub fn new(config: GameConfig) -> Self {
        let mut ids = IdAllocator::default();
        let player = Player::new(ids.next_id(), config.player_lives, config.additional_life_amount);
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            ids,
            scheduler: Scheduler::new(),
            player,
            asteroids: EntityGroup::new(GroupTag::Asteroids),
            saucers: EntityGroup::new(GroupTag::Saucers),
            player_projectiles: EntityGroup::new(GroupTag::PlayerProjectiles),
            saucer_projectiles: EntityGroup::new(GroupTag::SaucerProjectiles),
            explosions: EntityGroup::new(GroupTag::Explosions),
            wave_index: 0,
            wave_size: config.initial_wave_size,
            wave_pending: false,
            time_ticks: 0,
            events: Vec::new(),
            started: false,
            config,
        }
    }

    /// Assets every entity kind needs
    pub fn preload() -> AssetManifest {
        let mut manifest = AssetManifest::default();
        Player::preload(&mut manifest);
        EntityGroup::<Asteroid>::preload(&mut manifest);
        EntityGroup::<Saucer>::preload(&mut manifest);
        EntityGroup::<Projectile>::preload(&mut manifest);
        EntityGroup::<Explosion>::preload(&mut manifest);
        manifest
    }

    /// Register collision pairs, spawn the player, telegraph the first wave
    /// and start the saucer timer
    pub fn start(&mut self, engine: &mut dyn Engine) -> Result<(), SimError> {
        if self.started {
            return Err(SimError::AlreadyStarted);
        }
        self.started = true;

        engine.register_collision(GroupTag::Player, GroupTag::Asteroids);
        engine.register_collision(GroupTag::Player, GroupTag::Saucers);
        engine.register_collision(GroupTag::Player, GroupTag::SaucerProjectiles);
        engine.register_collision(GroupTag::PlayerProjectiles, GroupTag::Asteroids);
        engine.register_collision(GroupTag::PlayerProjectiles, GroupTag::Saucers);
        engine.register_collision(GroupTag::SaucerProjectiles, GroupTag::Asteroids);

        let center = engine.world_bounds().center();
        self.spawn_player(engine, center, false);
        self.request_wave(engine, self.config.initial_wave_size);
        self.scheduler
            .schedule(self.config.saucer_spawn_interval_ms, Task::SaucerCycle);

        log::info!("Game started (seed {})", self.config.seed);
        Ok(())
    }

    // === Spawning ===

    pub(crate) fn spawn_player(&mut self, engine: &mut dyn Engine, position: Vec2, invincible: bool) {
        let mut commands = Vec::new();
        self.player.spawn(engine, position, invincible, &mut commands);
        for command in commands {
            if let Command::Schedule { delay_ms, task } = command {
                self.scheduler.schedule(delay_ms, task);
            }
        }
        self.events.push(GameEvent::PlayerSpawned { invincible });
    }

    pub fn spawn_asteroid(
        &mut self,
        engine: &mut dyn Engine,
        spawn: AsteroidSpawn,
    ) -> Result<EntityId, SimError> {
        let mut cx = SpawnContext {
            engine,
            rng: &mut self.rng,
            ids: &mut self.ids,
        };
        self.asteroids.spawn_one(&mut cx, spawn)
    }

    pub fn spawn_saucer(&mut self, engine: &mut dyn Engine, spawn: SaucerSpawn) -> Result<EntityId, SimError> {
        let mut cx = SpawnContext {
            engine,
            rng: &mut self.rng,
            ids: &mut self.ids,
        };
        let id = self.saucers.spawn_one(&mut cx, spawn)?;
        self.events.push(GameEvent::SaucerSpawned {
            id,
            level: spawn.level,
        });
        log::info!("Saucer {} spawned (level {})", id, spawn.level);
        Ok(id)
    }

    /// Spawn a projectile into its faction's group and schedule its expiry
    pub fn spawn_projectile(
        &mut self,
        engine: &mut dyn Engine,
        spawn: ProjectileSpawn,
    ) -> Result<EntityId, SimError> {
        let mut cx = SpawnContext {
            engine,
            rng: &mut self.rng,
            ids: &mut self.ids,
        };
        let group = match spawn.faction {
            Faction::Player => &mut self.player_projectiles,
            Faction::Saucer => &mut self.saucer_projectiles,
        };
        let id = group.spawn_one(&mut cx, spawn)?;
        self.scheduler.schedule(
            Projectile::LIFESPAN_MS,
            Task::ExpireProjectile {
                faction: spawn.faction,
                id,
            },
        );
        Ok(id)
    }

    /// Spawn an explosion that removes itself when its animation ends
    pub fn spawn_explosion(&mut self, engine: &mut dyn Engine, position: Vec2) -> Result<EntityId, SimError> {
        let mut cx = SpawnContext {
            engine,
            rng: &mut self.rng,
            ids: &mut self.ids,
        };
        let id = self.explosions.spawn_one(&mut cx, ExplosionSpawn { position })?;
        self.scheduler
            .schedule(Explosion::lifetime_ms(), Task::FinishExplosion(id));
        Ok(id)
    }

    // === Destruction ===

    /// Destroy (and split) an asteroid; an emptied field telegraphs the next wave
    pub fn destroy_asteroid(
        &mut self,
        engine: &mut dyn Engine,
        id: EntityId,
    ) -> Result<AsteroidDestroyed, SimError> {
        let destroyed = {
            let mut cx = SpawnContext {
                engine: &mut *engine,
                rng: &mut self.rng,
                ids: &mut self.ids,
            };
            self.asteroids.destroy(&mut cx, id)?
        };
        self.events.push(GameEvent::AsteroidDestroyed {
            id,
            level: destroyed.level,
            children: destroyed.children.len() as u32,
        });

        if self.asteroids.is_empty() && !self.wave_pending && !self.is_game_over() {
            let count = next_wave_size(
                self.wave_size,
                self.score(),
                self.config.difficulty_increment_amount,
                self.config.max_wave_size,
            );
            self.request_wave(engine, count);
        }
        Ok(destroyed)
    }

    pub fn destroy_saucer(&mut self, engine: &mut dyn Engine, id: EntityId) -> Result<Saucer, SimError> {
        let saucer = self.saucers.remove(engine, id)?;
        let level = saucer.level().unwrap_or(Saucer::MIN_LEVEL);
        self.events.push(GameEvent::SaucerDestroyed { id, level });
        Ok(saucer)
    }

    pub fn destroy_projectile(
        &mut self,
        engine: &mut dyn Engine,
        faction: Faction,
        id: EntityId,
    ) -> Result<Projectile, SimError> {
        match faction {
            Faction::Player => self.player_projectiles.remove(engine, id),
            Faction::Saucer => self.saucer_projectiles.remove(engine, id),
        }
    }

    // === Waves and scoring ===

    /// Telegraph a wave of `count` asteroids, avoiding the player's current position
    pub fn request_wave(&mut self, engine: &dyn Engine, count: u32) {
        let count = count.clamp(1, self.config.max_wave_size.max(1));
        let center = if self.player.is_alive() {
            engine
                .body(self.player.visual())
                .map_or(self.player.body().position, |body| body.position)
        } else {
            engine.world_bounds().center()
        };

        self.wave_size = count;
        self.wave_pending = true;
        self.scheduler.schedule(
            self.config.asteroid_spawn_delay_ms,
            Task::SpawnWave {
                count,
                player_zone: KeepoutZone::new(center, self.config.keepout_zone_radius),
            },
        );
        self.events.push(GameEvent::WaveRequested {
            wave: self.wave_index + 1,
            count,
        });
        log::info!("Wave {} incoming: {} asteroids", self.wave_index + 1, count);
    }

    /// Credit the player for destroying an entity (no-op once the game is over)
    pub fn award(&mut self, kind: EntityKind, level: u8) {
        if self.is_game_over() {
            return;
        }
        let Some(points) = self.config.scoring.points(kind, level) else {
            return;
        };
        let granted = self
            .player
            .add_score(points, self.config.additional_life_amount);
        self.events.push(GameEvent::ScoreAwarded {
            kind,
            points,
            total: self.player.score(),
        });
        if granted > 0 {
            log::info!("Extra life! Lives: {}", self.player.lives());
            self.events.push(GameEvent::ExtraLife {
                lives: self.player.lives(),
            });
        }
    }

    /// Apply commands emitted by entity ticks
    pub(crate) fn apply_commands(
        &mut self,
        engine: &mut dyn Engine,
        commands: Vec<Command>,
    ) -> Result<(), SimError> {
        for command in commands {
            match command {
                Command::FireProjectile {
                    faction,
                    origin,
                    angle,
                } => {
                    if self.is_game_over() {
                        continue;
                    }
                    self.spawn_projectile(
                        engine,
                        ProjectileSpawn {
                            origin,
                            angle,
                            faction,
                        },
                    )?;
                }
                Command::Schedule { delay_ms, task } => self.scheduler.schedule(delay_ms, task),
            }
        }
        Ok(())
    }

    // === Presentation ===

    pub fn score(&self) -> u64 {
        self.player.score()
    }

    pub fn lives(&self) -> u32 {
        self.player.lives()
    }

    pub fn is_game_over(&self) -> bool {
        self.player.is_game_over()
    }

    pub fn player_state(&self) -> PlayerState {
        self.player.state()
    }

    /// Waves spawned so far
    pub fn wave(&self) -> u32 {
        self.wave_index
    }

    pub fn wave_pending(&self) -> bool {
        self.wave_pending
    }

    pub fn time_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn asteroids(&self) -> &EntityGroup<Asteroid> {
        &self.asteroids
    }

    pub fn saucers(&self) -> &EntityGroup<Saucer> {
        &self.saucers
    }

    pub fn player_projectiles(&self) -> &EntityGroup<Projectile> {
        &self.player_projectiles
    }

    pub fn saucer_projectiles(&self) -> &EntityGroup<Projectile> {
        &self.saucer_projectiles
    }

    pub fn explosions(&self) -> &EntityGroup<Explosion> {
        &self.explosions
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            time_ms: self.time_ms(),
            score: self.score(),
            lives: self.lives(),
            wave: self.wave_index,
            game_over: self.is_game_over(),
            player_state: self.player.state(),
            player: self.player.is_alive().then(|| self.player.snapshot()),
            asteroids: self.asteroids.iter().map(Entity::snapshot).collect(),
            saucers: self.saucers.iter().map(Entity::snapshot).collect(),
            player_projectiles: self.player_projectiles.iter().map(Entity::snapshot).collect(),
            saucer_projectiles: self.saucer_projectiles.iter().map(Entity::snapshot).collect(),
            explosions: self.explosions.iter().map(Entity::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HeadlessEngine;

    fn started() -> (GameState, HeadlessEngine) {
        let config = GameConfig::with_seed(1234);
        let mut engine = HeadlessEngine::new(config.bounds());
        let mut state = GameState::new(config);
        state.start(&mut engine).unwrap();
        (state, engine)
    }

    #[test]
    fn test_preload_covers_every_visual() {
        let manifest = GameState::preload();
        for key in [
            "player",
            "asteroid_01",
            "asteroid_02",
            "asteroid_03",
            "saucer_01",
            "saucer_02",
            "projectile",
            "explosion-spritesheet",
        ] {
            assert!(manifest.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_start_spawns_vulnerable_player_and_telegraphs_wave() {
        let (mut state, engine) = started();
        assert_eq!(state.player_state(), PlayerState::AliveVulnerable);
        assert_eq!(state.lives(), 3);
        assert!(state.wave_pending());
        assert!(state.asteroids().is_empty());
        assert_eq!(engine.collision_pairs().len(), 6);
        assert_eq!(
            state.scheduler().count_pending(|t| matches!(t, Task::SpawnWave { count: 5, .. })),
            1
        );
        assert_eq!(
            state.scheduler().count_pending(|t| matches!(t, Task::SaucerCycle)),
            1
        );
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::WaveRequested { wave: 1, count: 5 }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_start_twice_fails() {
        let (mut state, mut engine) = started();
        assert_eq!(state.start(&mut engine), Err(SimError::AlreadyStarted));
    }

    #[test]
    fn test_projectile_goes_to_faction_group() {
        let (mut state, mut engine) = started();
        let spawn = ProjectileSpawn {
            origin: Vec2::new(10.0, 10.0),
            angle: 0.0,
            faction: Faction::Saucer,
        };
        let id = state.spawn_projectile(&mut engine, spawn).unwrap();
        assert!(state.saucer_projectiles().contains(id));
        assert!(state.player_projectiles().is_empty());
        assert_eq!(
            state.scheduler().count_pending(|t| matches!(
                t,
                Task::ExpireProjectile { faction: Faction::Saucer, id: pid } if *pid == id
            )),
            1
        );
    }

    #[test]
    fn test_award_scores_and_grants_lives() {
        let (mut state, _engine) = started();
        state.award(EntityKind::Asteroid, 1);
        assert_eq!(state.score(), 20);
        state.award(EntityKind::Projectile, 1);
        assert_eq!(state.score(), 20);

        for _ in 0..10 {
            state.award(EntityKind::Saucer, 2);
        }
        assert_eq!(state.score(), 10_020);
        assert_eq!(state.lives(), 4);
        assert!(state.drain_events().contains(&GameEvent::ExtraLife { lives: 4 }));
    }

    #[test]
    fn test_emptying_field_requests_bigger_wave() {
        let (mut state, mut engine) = started();
        // Pretend the first wave already landed
        state.wave_pending = false;
        state.wave_size = 4;
        state.player.add_score(5000, state.config.additional_life_amount);

        let id = state
            .spawn_asteroid(
                &mut engine,
                AsteroidSpawn {
                    position: Vec2::new(50.0, 50.0),
                    level: Asteroid::MAX_LEVEL,
                    velocity: None,
                },
            )
            .unwrap();
        state.destroy_asteroid(&mut engine, id).unwrap();

        assert!(state.wave_pending());
        // 4 * (1 + 5000 / 5000)
        assert_eq!(state.wave_size, 8);
    }

    #[test]
    fn test_snapshot_lists_groups() {
        let (mut state, mut engine) = started();
        state
            .spawn_asteroid(
                &mut engine,
                AsteroidSpawn {
                    position: Vec2::new(50.0, 50.0),
                    level: 2,
                    velocity: None,
                },
            )
            .unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.asteroids.len(), 1);
        assert_eq!(snapshot.asteroids[0].level, Some(2));
        assert!(snapshot.player.is_some());
        assert!(!snapshot.game_over);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }
}
