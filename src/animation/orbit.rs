//! Circling around a point while facing the direction of travel (the firefly).

use std::f32::consts::FRAC_PI_2;

use cgmath::Vector3;

use crate::{
    animation::Animator,
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

#[derive(Clone, Debug)]
pub struct OrbitConfig {
    pub center: Vector3<f32>,
    pub radius: f32,
    /// Radians per second.
    pub frequency: f32,
    /// `(amplitude, frequency)` of a vertical bob around `center.y`.
    pub hover: Option<(f32, f32)>,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            center: Vector3::new(0.0, 0.0, 0.0),
            radius: 1.0,
            frequency: 1.0,
            hover: None,
        }
    }
}

pub struct OrbitMotion {
    node: NodeId,
    config: OrbitConfig,
    time: f32,
}

impl OrbitMotion {
    pub fn new(node: NodeId, config: OrbitConfig) -> Self {
        Self {
            node,
            config,
            time: 0.0,
        }
    }

    /// Position and yaw after `time` seconds.
    pub fn sample(&self, time: f32) -> (Vector3<f32>, f32) {
        let c = &self.config;
        let angle = time * c.frequency;
        let y = match c.hover {
            Some((amplitude, frequency)) => (time * frequency).sin() * amplitude + c.center.y,
            None => c.center.y,
        };
        let position = Vector3::new(
            angle.sin() * c.radius + c.center.x,
            y,
            angle.cos() * c.radius + c.center.z,
        );
        (position, angle + FRAC_PI_2)
    }
}

impl Animator for OrbitMotion {
    fn update(&mut self, graph: &mut SceneGraph, _input: &Input, dt: f32) {
        self.time += dt;
        let (position, yaw) = self.sample(self.time);
        graph.set_position(self.node, position);
        graph.set_rotation(self.node, Vector3::new(0.0, yaw, 0.0));
    }
}
