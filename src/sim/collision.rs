//! Collision response
//!
//! The engine reports overlaps as pairs of visual handles. Each handle is
//! mapped back to its entity through the group indexes, the pair is checked
//! against the registered collision pairs, and the hit is resolved with an
//! explosion at the contact midpoint and the destruction of both parties.
//! Player shots earn points; saucer shots only break asteroids. A dead player
//! gets a scheduled respawn.

use glam::Vec2;

use super::asteroid::Asteroid;
use super::entity::{Entity, EntityId, EntityKind, Faction};
use super::error::SimError;
use super::saucer::Saucer;
use super::scheduler::Task;
use super::state::{GameEvent, GameState};
use crate::engine::{Engine, VisualHandle};
use crate::midpoint;

/// Live entity a visual handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Player,
    Asteroid(EntityId),
    Saucer(EntityId),
    Projectile(Faction, EntityId),
    Explosion(EntityId),
}

/// Something that can kill the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hostile {
    Asteroid(EntityId),
    Saucer(EntityId),
    Projectile(EntityId),
}

/// Something a projectile can destroy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Asteroid(EntityId),
    Saucer(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Player(Hostile),
    Shot {
        faction: Faction,
        projectile: EntityId,
        target: Target,
    },
}

impl GameState {
    /// Map a visual handle to the live entity it belongs to
    pub fn lookup(&self, visual: VisualHandle) -> Option<EntityRef> {
        if self.player.is_alive() && self.player.visual() == visual {
            return Some(EntityRef::Player);
        }
        if let Some(id) = self.asteroids.id_for_visual(visual) {
            return Some(EntityRef::Asteroid(id));
        }
        if let Some(id) = self.saucers.id_for_visual(visual) {
            return Some(EntityRef::Saucer(id));
        }
        if let Some(id) = self.player_projectiles.id_for_visual(visual) {
            return Some(EntityRef::Projectile(Faction::Player, id));
        }
        if let Some(id) = self.saucer_projectiles.id_for_visual(visual) {
            return Some(EntityRef::Projectile(Faction::Saucer, id));
        }
        self.explosions
            .id_for_visual(visual)
            .map(EntityRef::Explosion)
    }
}

/// Pairs outside the registered collision table yield `None`
fn classify(a: EntityRef, b: EntityRef) -> Option<Contact> {
    use EntityRef as E;
    match (a, b) {
        (E::Player, E::Asteroid(id)) | (E::Asteroid(id), E::Player) => {
            Some(Contact::Player(Hostile::Asteroid(id)))
        }
        (E::Player, E::Saucer(id)) | (E::Saucer(id), E::Player) => {
            Some(Contact::Player(Hostile::Saucer(id)))
        }
        (E::Player, E::Projectile(Faction::Saucer, id))
        | (E::Projectile(Faction::Saucer, id), E::Player) => {
            Some(Contact::Player(Hostile::Projectile(id)))
        }
        (E::Projectile(Faction::Player, projectile), E::Asteroid(id))
        | (E::Asteroid(id), E::Projectile(Faction::Player, projectile)) => Some(Contact::Shot {
            faction: Faction::Player,
            projectile,
            target: Target::Asteroid(id),
        }),
        (E::Projectile(Faction::Player, projectile), E::Saucer(id))
        | (E::Saucer(id), E::Projectile(Faction::Player, projectile)) => Some(Contact::Shot {
            faction: Faction::Player,
            projectile,
            target: Target::Saucer(id),
        }),
        (E::Projectile(Faction::Saucer, projectile), E::Asteroid(id))
        | (E::Asteroid(id), E::Projectile(Faction::Saucer, projectile)) => Some(Contact::Shot {
            faction: Faction::Saucer,
            projectile,
            target: Target::Asteroid(id),
        }),
        _ => None,
    }
}

/// Resolve one overlap reported by the engine
///
/// Handles whose entity was already destroyed earlier in the same frame are
/// ignored, as are pairs that are not registered to collide.
pub fn resolve_collision(
    state: &mut GameState,
    engine: &mut dyn Engine,
    a: VisualHandle,
    b: VisualHandle,
) -> Result<(), SimError> {
    let (Some(first), Some(second)) = (state.lookup(a), state.lookup(b)) else {
        log::debug!("Ignoring collision with stale visual ({:?}, {:?})", a, b);
        return Ok(());
    };
    match classify(first, second) {
        Some(Contact::Player(hostile)) => player_hit(state, engine, hostile),
        Some(Contact::Shot {
            faction,
            projectile,
            target,
        }) => projectile_hit(state, engine, faction, projectile, target),
        None => {
            log::debug!("Ignoring unregistered collision {:?} / {:?}", first, second);
            Ok(())
        }
    }
}

fn current_position(engine: &dyn Engine, visual: VisualHandle, fallback: Vec2) -> Vec2 {
    engine.body(visual).map_or(fallback, |body| body.position)
}

/// Kind, level and position of a live target
fn target_info(state: &GameState, engine: &dyn Engine, target: Target) -> Result<(EntityKind, u8, Vec2), SimError> {
    match target {
        Target::Asteroid(id) => {
            let asteroid = state.asteroids.get(id).ok_or(SimError::NotAMember {
                kind: EntityKind::Asteroid,
                id,
            })?;
            Ok((
                EntityKind::Asteroid,
                asteroid.level().unwrap_or(Asteroid::MIN_LEVEL),
                current_position(engine, asteroid.visual(), asteroid.body().position),
            ))
        }
        Target::Saucer(id) => {
            let saucer = state.saucers.get(id).ok_or(SimError::NotAMember {
                kind: EntityKind::Saucer,
                id,
            })?;
            Ok((
                EntityKind::Saucer,
                saucer.level().unwrap_or(Saucer::MIN_LEVEL),
                current_position(engine, saucer.visual(), saucer.body().position),
            ))
        }
    }
}

fn destroy_target(state: &mut GameState, engine: &mut dyn Engine, target: Target) -> Result<(), SimError> {
    match target {
        Target::Asteroid(id) => state.destroy_asteroid(engine, id).map(|_| ()),
        Target::Saucer(id) => state.destroy_saucer(engine, id).map(|_| ()),
    }
}

fn projectile_hit(
    state: &mut GameState,
    engine: &mut dyn Engine,
    faction: Faction,
    projectile: EntityId,
    target: Target,
) -> Result<(), SimError> {
    let shot_position = {
        let group = match faction {
            Faction::Player => &state.player_projectiles,
            Faction::Saucer => &state.saucer_projectiles,
        };
        let shot = group.get(projectile).ok_or(SimError::NotAMember {
            kind: EntityKind::Projectile,
            id: projectile,
        })?;
        current_position(engine, shot.visual(), shot.body().position)
    };
    let (kind, level, target_position) = target_info(state, engine, target)?;

    if faction == Faction::Player {
        state.award(kind, level);
    }
    state.spawn_explosion(engine, midpoint(shot_position, target_position))?;
    state.destroy_projectile(engine, faction, projectile)?;
    destroy_target(state, engine, target)?;
    log::debug!(
        "{:?} projectile {} destroyed {} (level {})",
        faction,
        projectile,
        kind,
        level
    );
    Ok(())
}

fn player_hit(state: &mut GameState, engine: &mut dyn Engine, hostile: Hostile) -> Result<(), SimError> {
    if !state.player.is_alive() || state.player.is_invincible() {
        return Ok(());
    }
    let player_position = current_position(engine, state.player.visual(), state.player.body().position);

    let (other_position, credit) = match hostile {
        Hostile::Asteroid(id) => {
            let (kind, level, position) = target_info(state, engine, Target::Asteroid(id))?;
            (position, Some((kind, level)))
        }
        Hostile::Saucer(id) => {
            let (kind, level, position) = target_info(state, engine, Target::Saucer(id))?;
            (position, Some((kind, level)))
        }
        Hostile::Projectile(id) => {
            let shot = state.saucer_projectiles.get(id).ok_or(SimError::NotAMember {
                kind: EntityKind::Projectile,
                id,
            })?;
            (current_position(engine, shot.visual(), shot.body().position), None)
        }
    };

    if !state.player.hit(engine) {
        return Ok(());
    }
    state.events.push(GameEvent::PlayerDied {
        lives_left: state.player.lives(),
    });
    log::info!("Player destroyed ({} lives left)", state.player.lives());

    state.spawn_explosion(engine, midpoint(player_position, other_position))?;
    if let Some((kind, level)) = credit {
        state.award(kind, level);
    }
    match hostile {
        Hostile::Asteroid(id) => destroy_target(state, engine, Target::Asteroid(id))?,
        Hostile::Saucer(id) => destroy_target(state, engine, Target::Saucer(id))?,
        Hostile::Projectile(id) => {
            state.destroy_projectile(engine, Faction::Saucer, id)?;
        }
    }
    state
        .scheduler
        .schedule(state.config.player_respawn_delay_ms, Task::RespawnPlayer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::engine::HeadlessEngine;
    use crate::sim::asteroid::AsteroidSpawn;
    use crate::sim::player::PlayerState;
    use crate::sim::projectile::ProjectileSpawn;
    use crate::sim::saucer::SaucerSpawn;

    fn started() -> (GameState, HeadlessEngine) {
        let config = GameConfig::with_seed(2024);
        let mut engine = HeadlessEngine::new(config.bounds());
        let mut state = GameState::new(config);
        state.start(&mut engine).unwrap();
        // The first wave is still telegraphed; keep the field under test control
        state.wave_pending = true;
        (state, engine)
    }

    fn asteroid(state: &mut GameState, engine: &mut HeadlessEngine, level: u8) -> EntityId {
        state
            .spawn_asteroid(
                engine,
                AsteroidSpawn {
                    position: Vec2::new(100.0, 100.0),
                    level,
                    velocity: None,
                },
            )
            .unwrap()
    }

    fn shot(state: &mut GameState, engine: &mut HeadlessEngine, faction: Faction) -> EntityId {
        state
            .spawn_projectile(
                engine,
                ProjectileSpawn {
                    origin: Vec2::new(110.0, 100.0),
                    angle: 0.0,
                    faction,
                },
            )
            .unwrap()
    }

    fn visual_of_asteroid(state: &GameState, id: EntityId) -> VisualHandle {
        state.asteroids().get(id).unwrap().visual()
    }

    #[test]
    fn test_lookup_classifies_handles() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 1);
        let bullet = shot(&mut state, &mut engine, Faction::Player);

        assert_eq!(state.lookup(state.player().visual()), Some(EntityRef::Player));
        assert_eq!(
            state.lookup(visual_of_asteroid(&state, rock)),
            Some(EntityRef::Asteroid(rock))
        );
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();
        assert_eq!(
            state.lookup(bullet_visual),
            Some(EntityRef::Projectile(Faction::Player, bullet))
        );
        assert_eq!(state.lookup(VisualHandle(9999)), None);
    }

    #[test]
    fn test_shot_splits_asteroid_and_scores() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 1);
        let bullet = shot(&mut state, &mut engine, Faction::Player);
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, rock_visual).unwrap();

        assert_eq!(state.score(), 20);
        assert!(state.player_projectiles().is_empty());
        assert!(!state.asteroids().contains(rock));
        assert_eq!(state.asteroids().len(), 2);
        assert!(state.asteroids().iter().all(|a| a.level() == Some(2)));
        assert_eq!(state.explosions().len(), 1);
        let boom = state.explosions().iter().next().unwrap();
        assert_eq!(boom.body().position, Vec2::new(105.0, 100.0));
        assert!(!engine.contains(rock_visual));
        assert!(!engine.contains(bullet_visual));
    }

    #[test]
    fn test_pair_order_does_not_matter() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 3);
        let bullet = shot(&mut state, &mut engine, Faction::Player);
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, rock_visual, bullet_visual).unwrap();
        assert_eq!(state.score(), 100);
        assert!(state.asteroids().is_empty());
    }

    #[test]
    fn test_stale_handles_are_ignored() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 1);
        let first = shot(&mut state, &mut engine, Faction::Player);
        let second = shot(&mut state, &mut engine, Faction::Player);
        let rock_visual = visual_of_asteroid(&state, rock);
        let first_visual = state.player_projectiles().get(first).unwrap().visual();
        let second_visual = state.player_projectiles().get(second).unwrap().visual();

        resolve_collision(&mut state, &mut engine, first_visual, rock_visual).unwrap();
        // Same frame, the asteroid is already gone
        resolve_collision(&mut state, &mut engine, second_visual, rock_visual).unwrap();

        assert_eq!(state.score(), 20);
        assert!(state.player_projectiles().contains(second));
        assert_eq!(state.asteroids().len(), 2);
    }

    #[test]
    fn test_saucer_shot_splits_asteroid_without_score() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 1);
        let bullet = shot(&mut state, &mut engine, Faction::Saucer);
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.saucer_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, rock_visual, bullet_visual).unwrap();

        assert_eq!(state.score(), 0);
        assert!(state.saucer_projectiles().is_empty());
        assert!(!state.asteroids().contains(rock));
        assert_eq!(state.asteroids().len(), 2);
        assert!(state.asteroids().iter().all(|a| a.level() == Some(2)));
        assert_eq!(state.explosions().len(), 1);
        assert_eq!(
            state.explosions().iter().next().unwrap().body().position,
            Vec2::new(105.0, 100.0)
        );
        assert!(!engine.contains(bullet_visual));
        assert!(
            !state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ScoreAwarded { .. }))
        );
    }

    #[test]
    fn test_saucer_shot_clearing_field_requests_next_wave() {
        let (mut state, mut engine) = started();
        state.wave_pending = false;
        let rock = asteroid(&mut state, &mut engine, 3);
        let bullet = shot(&mut state, &mut engine, Faction::Saucer);
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.saucer_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, rock_visual).unwrap();
        assert!(state.asteroids().is_empty());
        assert!(state.wave_pending());
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_player_hit_by_asteroid() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 2);
        let player_visual = state.player().visual();
        let rock_visual = visual_of_asteroid(&state, rock);

        resolve_collision(&mut state, &mut engine, player_visual, rock_visual).unwrap();

        assert_eq!(state.player_state(), PlayerState::DeadAwaitingRespawn);
        assert_eq!(state.lives(), 2);
        // Ramming still credits the asteroid and splits it
        assert_eq!(state.score(), 50);
        assert_eq!(state.asteroids().len(), 2);
        assert_eq!(
            state.scheduler().count_pending(|t| matches!(t, Task::RespawnPlayer)),
            1
        );
        assert!(state.drain_events().contains(&GameEvent::PlayerDied { lives_left: 2 }));
    }

    #[test]
    fn test_saucer_projectile_kills_without_score() {
        let (mut state, mut engine) = started();
        let bullet = shot(&mut state, &mut engine, Faction::Saucer);
        let player_visual = state.player().visual();
        let bullet_visual = state.saucer_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, player_visual).unwrap();
        assert_eq!(state.lives(), 2);
        assert_eq!(state.score(), 0);
        assert!(state.saucer_projectiles().is_empty());
    }

    #[test]
    fn test_shot_destroys_saucer() {
        let (mut state, mut engine) = started();
        let saucer = state
            .spawn_saucer(
                &mut engine,
                SaucerSpawn {
                    position: Vec2::new(100.0, 100.0),
                    level: 2,
                },
            )
            .unwrap();
        let bullet = shot(&mut state, &mut engine, Faction::Player);
        let saucer_visual = state.saucers().get(saucer).unwrap().visual();
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, saucer_visual).unwrap();
        assert_eq!(state.score(), 1000);
        assert!(state.saucers().is_empty());
    }

    #[test]
    fn test_invincible_player_is_untouched() {
        let (mut state, mut engine) = started();
        assert!(state.player.hit(&mut engine));
        let center = Vec2::new(400.0, 300.0);
        state.spawn_player(&mut engine, center, true);

        let rock = asteroid(&mut state, &mut engine, 1);
        let player_visual = state.player().visual();
        let rock_visual = visual_of_asteroid(&state, rock);
        resolve_collision(&mut state, &mut engine, player_visual, rock_visual).unwrap();

        assert_eq!(state.player_state(), PlayerState::AliveInvincible);
        assert_eq!(state.lives(), 2);
        assert!(state.asteroids().contains(rock));
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_clearing_field_requests_next_wave() {
        let (mut state, mut engine) = started();
        state.wave_pending = false;
        let rock = asteroid(&mut state, &mut engine, 3);
        let bullet = shot(&mut state, &mut engine, Faction::Player);
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, rock_visual).unwrap();
        assert!(state.asteroids().is_empty());
        assert!(state.wave_pending());
    }

    #[test]
    fn test_no_score_after_game_over() {
        let (mut state, mut engine) = started();
        let rock = asteroid(&mut state, &mut engine, 1);
        let bullet = shot(&mut state, &mut engine, Faction::Player);
        state.player.enter_game_over();
        let rock_visual = visual_of_asteroid(&state, rock);
        let bullet_visual = state.player_projectiles().get(bullet).unwrap().visual();

        resolve_collision(&mut state, &mut engine, bullet_visual, rock_visual).unwrap();
        assert_eq!(state.score(), 0);
        assert!(!state.asteroids().contains(rock));
    }
}
