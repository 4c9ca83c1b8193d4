//! Asteroid Waves - entity lifecycle and spawn orchestration for an arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity groups, waves, collisions, game state)
//! - `engine`: Boundary to the engine layer (visuals, motion, world bounds)
//! - `config`: Data-driven game balance and scoring table
//! - `random`: Seeded random helpers

pub mod config;
pub mod engine;
pub mod random;
pub mod sim;

pub use config::{ConfigError, GameConfig, ScoringTable};
pub use engine::{Body, Bounds, Engine, GroupTag, HeadlessEngine, VisualHandle};
pub use sim::{GameState, SimError, TickInput, resolve_collision, tick};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (100 Hz)
    pub const SIM_TICK_MS: u64 = 10;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = SIM_TICK_MS as f32 / 1000.0;

    /// Distance past the world edge before a visual wraps to the other side
    pub const WRAP_PADDING: f32 = 32.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Velocity vector of the given magnitude pointing along `rotation` (radians)
#[inline]
pub fn velocity_from_rotation(rotation: f32, speed: f32) -> Vec2 {
    Vec2::new(speed * rotation.cos(), speed * rotation.sin())
}

/// Point halfway between two positions (explosion placement)
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI + 0.5) - (-PI + 0.5)).abs() < 1e-5);
        assert!((normalize_angle(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_from_rotation_points_up() {
        let v = velocity_from_rotation(-FRAC_PI_2, 500.0);
        assert!(v.x.abs() < 1e-3);
        assert!((v.y + 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_midpoint() {
        let m = midpoint(Vec2::new(0.0, 10.0), Vec2::new(20.0, 30.0));
        assert_eq!(m, Vec2::new(10.0, 20.0));
    }
}
