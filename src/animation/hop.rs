//! Random hopping on the spot (the gnomes).

use std::f32::consts::TAU;

use rand::{Rng, rngs::StdRng};
use winit::keyboard::KeyCode;

use crate::{
    animation::Animator,
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

#[derive(Clone, Debug)]
pub struct HopConfig {
    /// Units per second squared, negative pulls down.
    pub gravity: f32,
    /// Upward speed of an unscaled jump, units per second.
    pub jump_velocity: f32,
    /// Mean and standard deviation of the random jump strength factor.
    pub strength: (f32, f32),
    /// Longest idle wait, in seconds, between deciding to jump and jumping.
    pub max_wait: f32,
    pub jump_key: Option<KeyCode>,
    pub auto_jump: bool,
}

impl Default for HopConfig {
    fn default() -> Self {
        Self {
            gravity: -60.0,
            jump_velocity: 15.0,
            strength: (1.3, 0.5),
            max_wait: 0.5,
            jump_key: Some(KeyCode::KeyU),
            auto_jump: false,
        }
    }
}

pub struct Hopper {
    node: NodeId,
    config: HopConfig,
    rng: StdRng,
    ground_y: Option<f32>,
    velocity: f32,
    on_ground: bool,
    wait: Option<f32>,
}

impl Hopper {
    pub fn new(node: NodeId, config: HopConfig, rng: StdRng) -> Self {
        Self {
            node,
            config,
            rng,
            ground_y: None,
            velocity: 0.0,
            on_ground: true,
            wait: None,
        }
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Normal sample (Box-Muller) of the strength factor, never negative.
    fn jump_strength(&mut self) -> f32 {
        let (mean, deviation) = self.config.strength;
        let u1 = 1.0 - self.rng.random::<f32>();
        let u2 = self.rng.random::<f32>();
        let normal = (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos();
        (mean + deviation * normal).max(0.0)
    }

    fn jump(&mut self) {
        self.velocity = self.config.jump_velocity * self.jump_strength();
        self.on_ground = false;
        log::debug!("Hopper jumps with {:.2} units/s", self.velocity);
    }
}

impl Animator for Hopper {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32) {
        let Some(transform) = graph.transform(self.node) else {
            return;
        };
        let mut position = transform.position;
        let ground_y = *self.ground_y.get_or_insert(position.y);

        let wants_jump = self.config.auto_jump
            || self.config.jump_key.is_some_and(|key| input.is_key_held(key));
        if self.on_ground && self.wait.is_none() && wants_jump {
            self.wait = Some(self.rng.random::<f32>() * self.config.max_wait);
        }
        match self.wait {
            Some(wait) if wait <= 0.0 => {
                self.wait = None;
                if self.on_ground {
                    self.jump();
                }
            }
            Some(wait) => self.wait = Some(wait - dt),
            None => {}
        }

        self.velocity += self.config.gravity * dt;
        position.y += self.velocity * dt;
        if position.y < ground_y {
            position.y = ground_y;
            self.velocity = 0.0;
            self.on_ground = true;
        }
        graph.set_position(self.node, position);
    }
}
