//! Headless engine double
//!
//! Linear motion, wrap-around and naive circle overlap. Enough to drive the
//! simulation from tests and the native demo without a renderer.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{Body, Bounds, Engine, GroupTag, VisualHandle};
use crate::consts::WRAP_PADDING;
use crate::normalize_angle;

/// A visual tracked by the headless engine
#[derive(Debug, Clone)]
pub struct HeadlessVisual {
    pub tag: GroupTag,
    pub key: String,
    pub body: Body,
    pub acceleration: Vec2,
    pub drag: Option<f32>,
    pub max_speed: Option<f32>,
    pub visible: bool,
}

/// In-memory engine with no rendering
#[derive(Debug, Clone)]
pub struct HeadlessEngine {
    bounds: Bounds,
    next_handle: u64,
    visuals: BTreeMap<VisualHandle, HeadlessVisual>,
    collision_pairs: Vec<(GroupTag, GroupTag)>,
}

impl HeadlessEngine {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            next_handle: 1,
            visuals: BTreeMap::new(),
            collision_pairs: Vec::new(),
        }
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.visuals.get(&handle)
    }

    pub fn contains(&self, handle: VisualHandle) -> bool {
        self.visuals.contains_key(&handle)
    }

    /// Number of live visuals in a collection
    pub fn count(&self, tag: GroupTag) -> usize {
        self.visuals.values().filter(|v| v.tag == tag).count()
    }

    pub fn is_visible(&self, handle: VisualHandle) -> bool {
        self.visuals.get(&handle).is_some_and(|v| v.visible)
    }

    /// Teleport a visual (scripted scenarios)
    pub fn set_position(&mut self, handle: VisualHandle, position: Vec2) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.body.position = position;
        }
    }

    pub fn collision_pairs(&self) -> &[(GroupTag, GroupTag)] {
        &self.collision_pairs
    }

    /// Integrate motion by `dt` seconds and wrap around the world edges
    pub fn step(&mut self, dt: f32) {
        let bounds = self.bounds;
        for visual in self.visuals.values_mut() {
            let body = &mut visual.body;
            body.velocity += visual.acceleration * dt;
            if let Some(drag) = visual.drag {
                body.velocity *= drag.powf(dt);
            }
            if let Some(max_speed) = visual.max_speed {
                body.velocity = body.velocity.clamp_length_max(max_speed);
            }
            body.position += body.velocity * dt;
            body.angle = normalize_angle(body.angle + body.angular_velocity * dt);
            body.position = wrap(body.position, bounds);
        }
    }

    /// Overlapping visual pairs for every registered collision pair
    pub fn overlaps(&self) -> Vec<(VisualHandle, VisualHandle)> {
        let mut hits = Vec::new();
        for &(tag_a, tag_b) in &self.collision_pairs {
            for (&ha, a) in self.visuals.iter().filter(|(_, v)| v.tag == tag_a) {
                for (&hb, b) in self.visuals.iter().filter(|(_, v)| v.tag == tag_b) {
                    let reach = collision_radius(&a.key) + collision_radius(&b.key);
                    if a.body.position.distance_squared(b.body.position) <= reach * reach {
                        hits.push((ha, hb));
                    }
                }
            }
        }
        hits
    }
}

impl Engine for HeadlessEngine {
    fn create_visual(&mut self, tag: GroupTag, key: &str, body: Body) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(
            handle,
            HeadlessVisual {
                tag,
                key: key.to_string(),
                body,
                acceleration: Vec2::ZERO,
                drag: None,
                max_speed: None,
                visible: true,
            },
        );
        handle
    }

    fn remove_visual(&mut self, handle: VisualHandle) {
        self.visuals.remove(&handle);
    }

    fn body(&self, handle: VisualHandle) -> Option<Body> {
        self.visuals.get(&handle).map(|v| v.body)
    }

    fn set_velocity(&mut self, handle: VisualHandle, velocity: Vec2) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.body.velocity = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: VisualHandle, angular_velocity: f32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.body.angular_velocity = angular_velocity;
        }
    }

    fn set_acceleration(&mut self, handle: VisualHandle, acceleration: Vec2) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.acceleration = acceleration;
        }
    }

    fn set_motion_limits(&mut self, handle: VisualHandle, drag: f32, max_speed: f32) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.drag = Some(drag);
            visual.max_speed = Some(max_speed);
        }
    }

    fn set_visible(&mut self, handle: VisualHandle, visible: bool) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.visible = visible;
        }
    }

    fn register_collision(&mut self, a: GroupTag, b: GroupTag) {
        if !self.collision_pairs.contains(&(a, b)) {
            self.collision_pairs.push((a, b));
        }
    }

    fn world_bounds(&self) -> Bounds {
        self.bounds
    }
}

fn wrap(position: Vec2, bounds: Bounds) -> Vec2 {
    let span_x = bounds.width + 2.0 * WRAP_PADDING;
    let span_y = bounds.height + 2.0 * WRAP_PADDING;
    Vec2::new(
        (position.x + WRAP_PADDING).rem_euclid(span_x) - WRAP_PADDING,
        (position.y + WRAP_PADDING).rem_euclid(span_y) - WRAP_PADDING,
    )
}

/// Approximate sprite radius per asset key
fn collision_radius(key: &str) -> f32 {
    match key {
        "asteroid_01" => 32.0,
        "asteroid_02" => 16.0,
        "asteroid_03" => 8.0,
        "saucer_01" => 16.0,
        "saucer_02" => 12.0,
        "player" => 12.0,
        "projectile" => 2.0,
        _ => 8.0,
    }
}
