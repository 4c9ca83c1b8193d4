//! The player's ship and its lifecycle
//!
//! ```text
//! spawn(invincible) ──► AliveInvincible ──(2 s)──► AliveVulnerable
//!                                                      │ hit
//!                                                      ▼
//!            respawn ◄──(2 s, lives > 0)── DeadAwaitingRespawn
//!                                                      │ lives == 0
//!                                                      ▼
//!                                                  GameOver
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{AssetManifest, Command, Entity, EntityId, EntityKind, Faction, TickContext};
use super::scheduler::Task;
use crate::engine::{Body, Engine, GroupTag, VisualHandle};
use crate::velocity_from_rotation;

/// Player lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    AliveVulnerable,
    /// Collisions are ignored
    AliveInvincible,
    /// Also the state before the first spawn
    DeadAwaitingRespawn,
    GameOver,
}

/// The player's ship, lives and score
#[derive(Debug, Clone)]
pub struct Player {
    id: EntityId,
    visual: VisualHandle,
    body: Body,
    state: PlayerState,
    can_fire: bool,
    /// Bumped on every spawn; stale timer tasks carry an older value
    generation: u32,
    lives: u32,
    score: u64,
    next_extra_life: u64,
}

impl Player {
    /// Heading at spawn (pointing up)
    pub const STARTING_ANGLE: f32 = -FRAC_PI_2;
    /// Per-second velocity damping
    pub const DRAG: f32 = 0.99;
    pub const MAX_VELOCITY: f32 = 200.0;
    /// Degrees per second
    pub const ANGULAR_VELOCITY: f32 = 200.0;
    /// Shots per second
    pub const FIRE_RATE: u64 = 10;
    pub const INVINCIBILITY_TIME_MS: u64 = 2000;
    /// Blink half-period while invincible
    pub const FLASH_TIME_MS: u64 = 100;

    pub fn new(id: EntityId, lives: u32, additional_life_amount: u64) -> Self {
        Self {
            id,
            visual: VisualHandle::DETACHED,
            body: Body::default(),
            state: PlayerState::DeadAwaitingRespawn,
            can_fire: true,
            generation: 0,
            lives,
            score: 0,
            next_extra_life: additional_life_amount,
        }
    }

    pub fn preload(manifest: &mut AssetManifest) {
        manifest.image("player", "assets/sprites/player.png");
    }

    /// Create the ship's visual at `position`
    ///
    /// Invincible spawns schedule their own expiry and start blinking.
    pub fn spawn(
        &mut self,
        engine: &mut dyn Engine,
        position: Vec2,
        invincible: bool,
        commands: &mut Vec<Command>,
    ) {
        self.generation += 1;
        self.body = Body {
            position,
            angle: Self::STARTING_ANGLE,
            ..Default::default()
        };
        self.visual = engine.create_visual(GroupTag::Player, "player", self.body);
        engine.set_motion_limits(self.visual, Self::DRAG, Self::MAX_VELOCITY);
        self.can_fire = true;

        if invincible {
            self.state = PlayerState::AliveInvincible;
            commands.push(Command::Schedule {
                delay_ms: Self::INVINCIBILITY_TIME_MS,
                task: Task::EndInvincibility {
                    generation: self.generation,
                },
            });
            self.blink(engine, self.generation, false, commands);
        } else {
            self.state = PlayerState::AliveVulnerable;
        }
        log::debug!("Player spawned (invincible: {}, generation {})", invincible, self.generation);
    }

    /// Apply a destructive collision. Returns true if the player died.
    pub fn hit(&mut self, engine: &mut dyn Engine) -> bool {
        if self.state != PlayerState::AliveVulnerable {
            return false;
        }
        if let Some(body) = engine.body(self.visual) {
            self.body = body;
        }
        engine.remove_visual(self.visual);
        self.lives = self.lives.saturating_sub(1);
        self.state = PlayerState::DeadAwaitingRespawn;
        true
    }

    /// Add points, granting one life per `additional_life_amount` threshold crossed
    pub fn add_score(&mut self, points: u64, additional_life_amount: u64) -> u32 {
        self.score += points;
        let mut granted = 0;
        while self.score >= self.next_extra_life {
            self.lives += 1;
            self.next_extra_life += additional_life_amount;
            granted += 1;
        }
        granted
    }

    /// Invincibility timer expiry. Ignored if a newer spawn happened.
    pub fn end_invincibility(&mut self, generation: u32) -> bool {
        if generation != self.generation || self.state != PlayerState::AliveInvincible {
            return false;
        }
        self.state = PlayerState::AliveVulnerable;
        true
    }

    /// Show/hide the ship while invincible, scheduling the next toggle
    pub fn blink(
        &mut self,
        engine: &mut dyn Engine,
        generation: u32,
        visible: bool,
        commands: &mut Vec<Command>,
    ) {
        if generation != self.generation || !self.is_alive() {
            return;
        }
        if self.state != PlayerState::AliveInvincible {
            engine.set_visible(self.visual, true);
            return;
        }
        engine.set_visible(self.visual, visible);
        commands.push(Command::Schedule {
            delay_ms: Self::FLASH_TIME_MS,
            task: Task::BlinkPlayer {
                generation,
                visible: !visible,
            },
        });
    }

    /// Fire cooldown expiry
    pub fn reload(&mut self, generation: u32) {
        if generation == self.generation {
            self.can_fire = true;
        }
    }

    pub fn enter_game_over(&mut self) {
        self.state = PlayerState::GameOver;
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        matches!(
            self.state,
            PlayerState::AliveVulnerable | PlayerState::AliveInvincible
        )
    }

    pub fn is_invincible(&self) -> bool {
        self.state == PlayerState::AliveInvincible
    }

    pub fn is_game_over(&self) -> bool {
        self.state == PlayerState::GameOver
    }

    pub fn can_fire(&self) -> bool {
        self.can_fire
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u64 {
        self.score
    }
}

impl Entity for Player {
    const KIND: EntityKind = EntityKind::Player;

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

    /// Thrust, rotation and firing; only while alive
    fn tick(&mut self, ctx: &mut TickContext<'_>) {
        if !self.is_alive() {
            return;
        }
        if let Some(body) = ctx.engine.body(self.visual) {
            self.body = body;
        }
        let input = ctx.input;

        let acceleration = if input.thrust {
            velocity_from_rotation(self.body.angle, Self::MAX_VELOCITY)
        } else {
            Vec2::ZERO
        };
        ctx.engine.set_acceleration(self.visual, acceleration);

        let spin = if input.rotate_left {
            -Self::ANGULAR_VELOCITY
        } else if input.rotate_right {
            Self::ANGULAR_VELOCITY
        } else {
            0.0
        };
        ctx.engine.set_angular_velocity(self.visual, spin.to_radians());

        if input.fire && self.can_fire {
            ctx.commands.push(Command::FireProjectile {
                faction: Faction::Player,
                origin: self.body.position,
                angle: self.body.angle,
            });
            self.can_fire = false;
            ctx.commands.push(Command::Schedule {
                delay_ms: 1000 / Self::FIRE_RATE,
                task: Task::PlayerFireReady {
                    generation: self.generation,
                },
            });
        }
    }
}
