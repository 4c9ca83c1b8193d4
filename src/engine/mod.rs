//! Engine layer boundary
//!
//! The simulation never integrates motion or tests shape overlap itself. It
//! asks the engine to create visuals, steer them, and reports collisions
//! the engine detects back through `sim::resolve_collision`.

pub mod headless;

pub use headless::HeadlessEngine;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to an engine-side visual object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

impl VisualHandle {
    /// Placeholder for an entity whose visual has not been created yet
    pub const DETACHED: VisualHandle = VisualHandle(0);
}

/// Engine-level collection a visual belongs to (collision pairs are registered per tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupTag {
    Player,
    Asteroids,
    Saucers,
    PlayerProjectiles,
    SaucerProjectiles,
    Explosions,
}

/// Kinematic state of a visual
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading (radians)
    pub angle: f32,
    /// Radians per second
    pub angular_velocity: f32,
}

impl Body {
    /// Body at rest at `position`
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// World dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Capabilities the simulation consumes from the engine layer
///
/// Operations on a handle that was already removed must be no-ops: pending
/// simulation work may still name a visual that died earlier in the tick.
pub trait Engine {
    /// Create a visual in collection `tag` using asset `key`
    fn create_visual(&mut self, tag: GroupTag, key: &str, body: Body) -> VisualHandle;
    fn remove_visual(&mut self, handle: VisualHandle);
    /// Current kinematic state, None once removed
    fn body(&self, handle: VisualHandle) -> Option<Body>;
    fn set_velocity(&mut self, handle: VisualHandle, velocity: Vec2);
    fn set_angular_velocity(&mut self, handle: VisualHandle, angular_velocity: f32);
    fn set_acceleration(&mut self, handle: VisualHandle, acceleration: Vec2);
    /// Per-second velocity damping factor and speed cap
    fn set_motion_limits(&mut self, handle: VisualHandle, drag: f32, max_speed: f32);
    fn set_visible(&mut self, handle: VisualHandle, visible: bool);
    /// Ask the engine to report overlaps between members of `a` and `b`
    fn register_collision(&mut self, a: GroupTag, b: GroupTag);
    fn world_bounds(&self) -> Bounds;
}
