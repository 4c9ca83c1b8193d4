//! Fixed timestep simulation tick
//!
//! One tick runs every task that came due, ticks the player and each group
//! in a fixed order, then applies the commands those ticks emitted.

use rand::Rng;

use super::entity::{Entity, Faction, SpawnContext, TickContext};
use super::error::SimError;
use super::saucer::Saucer;
use super::scheduler::Task;
use super::state::{GameEvent, GameState};
use crate::engine::Engine;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Accelerate along the ship's heading
    pub thrust: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
    pub fire: bool,
}

/// Advance the game state by `dt_ms`
pub fn tick(
    state: &mut GameState,
    engine: &mut dyn Engine,
    input: &TickInput,
    dt_ms: u64,
) -> Result<(), SimError> {
    if !state.started {
        return Err(SimError::NotStarted);
    }

    state.scheduler.advance(dt_ms);
    while let Some(task) = state.scheduler.pop_due() {
        run_task(state, engine, task)?;
    }

    // No player control once the run has ended
    let input = if state.is_game_over() {
        TickInput::default()
    } else {
        input.clone()
    };

    let mut commands = Vec::new();
    {
        let mut ctx = TickContext {
            input: &input,
            engine: &mut *engine,
            commands: &mut commands,
        };
        state.player.tick(&mut ctx);
        state.asteroids.tick_all(&mut ctx);
        state.saucers.tick_all(&mut ctx);
        state.player_projectiles.tick_all(&mut ctx);
        state.saucer_projectiles.tick_all(&mut ctx);
        state.explosions.tick_all(&mut ctx);
    }
    state.apply_commands(engine, commands)?;

    state.time_ticks += 1;
    Ok(())
}

/// Run one scheduled task, skipping it if its target is gone
fn run_task(state: &mut GameState, engine: &mut dyn Engine, task: Task) -> Result<(), SimError> {
    match task {
        Task::SpawnWave { count, player_zone } => {
            state.wave_pending = false;
            if state.is_game_over() {
                return Ok(());
            }
            let radii = state.config.keepout_radii();
            let attempts = state.config.placement_attempts;
            let wave = {
                let mut cx = SpawnContext {
                    engine: &mut *engine,
                    rng: &mut state.rng,
                    ids: &mut state.ids,
                };
                state
                    .asteroids
                    .spawn_multiple(&mut cx, count, &radii, vec![player_zone], attempts)?
            };
            state.wave_index += 1;
            let fallbacks = wave.plan.fallbacks() as u32;
            state.events.push(GameEvent::WaveSpawned {
                wave: state.wave_index,
                count: wave.ids.len() as u32,
                fallbacks,
            });
            if fallbacks > 0 {
                state.events.push(GameEvent::PlacementFallback {
                    wave: state.wave_index,
                    overlapping: fallbacks,
                });
            }
            log::info!(
                "Wave {} spawned: {} asteroids ({} fallback placements)",
                state.wave_index,
                wave.ids.len(),
                fallbacks
            );
        }
        Task::SaucerCycle => {
            if state.is_game_over() {
                return Ok(());
            }
            let interval = state.config.saucer_spawn_interval_ms;
            state.scheduler.schedule(interval, Task::SaucerCycle);
            let delay = state.rng.random_range(0..interval.max(1));
            state.scheduler.schedule(delay, Task::SpawnSaucer);
        }
        Task::SpawnSaucer => {
            if state.is_game_over() {
                return Ok(());
            }
            let spawn = Saucer::random_spawn(&mut state.rng, engine.world_bounds());
            state.spawn_saucer(engine, spawn)?;
        }
        Task::SaucerFireReady(id) => {
            if let Some(saucer) = state.saucers.get_mut(id) {
                saucer.reload();
            }
        }
        Task::ExpireProjectile { faction, id } => {
            let live = match faction {
                Faction::Player => state.player_projectiles.contains(id),
                Faction::Saucer => state.saucer_projectiles.contains(id),
            };
            if live {
                state.destroy_projectile(engine, faction, id)?;
            }
        }
        Task::FinishExplosion(id) => {
            if state.explosions.contains(id) {
                state.explosions.remove(engine, id)?;
            }
        }
        Task::PlayerFireReady { generation } => state.player.reload(generation),
        Task::EndInvincibility { generation } => {
            if state.player.end_invincibility(generation) {
                engine.set_visible(state.player.visual(), true);
                log::debug!("Player invincibility ended");
            }
        }
        Task::BlinkPlayer {
            generation,
            visible,
        } => {
            let mut commands = Vec::new();
            state.player.blink(engine, generation, visible, &mut commands);
            state.apply_commands(engine, commands)?;
        }
        Task::RespawnPlayer => {
            if state.is_game_over() || state.player.is_alive() {
                return Ok(());
            }
            if state.player.lives() == 0 {
                state
                    .scheduler
                    .schedule(state.config.game_over_delay_ms, Task::GameOver);
            } else {
                let center = engine.world_bounds().center();
                state.spawn_player(engine, center, true);
                log::info!("Player respawned ({} lives left)", state.player.lives());
            }
        }
        Task::GameOver => {
            if state.is_game_over() || state.player.is_alive() {
                return Ok(());
            }
            // A shot still in flight may have earned a life during the delay
            if state.player.lives() > 0 {
                let center = engine.world_bounds().center();
                state.spawn_player(engine, center, true);
                log::info!("Player respawned ({} lives left)", state.player.lives());
                return Ok(());
            }
            state.player.enter_game_over();
            state.events.push(GameEvent::GameOver {
                score: state.score(),
            });
            log::info!("Game over! Final score: {}", state.score());
        }
    }
    Ok(())
}
