//! Short-lived mesh particles rising from a disc (the cauldron fumes).

use std::{f32::consts::TAU, rc::Rc};

use cgmath::Vector3;
use rand::{Rng, rngs::StdRng};
use winit::keyboard::KeyCode;

use crate::{
    animation::{Animator, mix, mix_vec3, sample_range},
    data_structures::{
        model::MeshAsset,
        scene_graph::{MeshNode, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    input::Input,
};

#[derive(Clone, Debug)]
pub struct ParticleConfig {
    /// Radius of the spawn disc on the emitter's XZ plane.
    pub radius: f32,
    pub spawn_interval: f32,
    pub height_range: (f32, f32),
    pub lifetime_range: (f32, f32),
    pub scale_range: (f32, f32),
    /// Flips `active` when pressed.
    pub toggle_key: Option<KeyCode>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            spawn_interval: 0.5,
            height_range: (1.0, 2.0),
            lifetime_range: (1.0, 2.0),
            scale_range: (1.0, 2.0),
            toggle_key: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub node: NodeId,
    pub start_position: Vector3<f32>,
    pub end_position: Vector3<f32>,
    pub start_scale: f32,
    pub end_scale: f32,
    pub start_rotation: Vector3<f32>,
    pub end_rotation: Vector3<f32>,
    pub lifetime: f32,
    pub elapsed: f32,
}

impl Particle {
    /// Every start/end pair interpolated by `elapsed / lifetime`.
    pub fn transform(&self) -> Transform {
        let t = if self.lifetime > 0.0 {
            (self.elapsed / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let scale = mix(self.start_scale, self.end_scale, t);
        Transform {
            position: mix_vec3(self.start_position, self.end_position, t),
            rotation: mix_vec3(self.start_rotation, self.end_rotation, t),
            scale: Vector3::new(scale, scale, scale),
            ..Default::default()
        }
    }

    /// Returns true once the particle outlived its lifetime.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed > self.lifetime
    }
}

pub struct ParticleSystem {
    emitter: NodeId,
    meshes: Vec<Rc<MeshAsset>>,
    config: ParticleConfig,
    rng: StdRng,
    active: bool,
    timer: f32,
    particles: Vec<Particle>,
    pool: Vec<NodeId>,
}

impl ParticleSystem {
    /// Particles become children of `emitter` and pick one of `meshes` at random.
    pub fn new(
        emitter: NodeId,
        meshes: Vec<Rc<MeshAsset>>,
        config: ParticleConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            emitter,
            meshes,
            config,
            rng,
            active: false,
            timer: 0.0,
            particles: Vec::new(),
            pool: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Retired particle nodes waiting for reuse.
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    fn random_position_in_disc(&mut self) -> Vector3<f32> {
        let angle = TAU * self.rng.random::<f32>();
        let r = self.config.radius * self.rng.random::<f32>().sqrt();
        Vector3::new(r * angle.cos(), 0.0, r * angle.sin())
    }

    fn random_rotation(&mut self) -> Vector3<f32> {
        Vector3::new(
            self.rng.random_range(0.0..TAU),
            self.rng.random_range(0.0..TAU),
            self.rng.random_range(0.0..TAU),
        )
    }

    /// Activates one particle, reusing a pooled node when possible.
    pub fn spawn(&mut self, graph: &mut SceneGraph) -> Option<NodeId> {
        if self.meshes.is_empty() {
            log::warn!("Particle system has no meshes to spawn");
            return None;
        }
        let start_position = self.random_position_in_disc();
        let rise = sample_range(&mut self.rng, self.config.height_range);
        let start_scale = sample_range(&mut self.rng, self.config.scale_range);
        let start_rotation = self.random_rotation();
        let end_rotation = self.random_rotation();
        let lifetime = sample_range(&mut self.rng, self.config.lifetime_range);
        let mesh = Rc::clone(&self.meshes[self.rng.random_range(0..self.meshes.len())]);
        let kind = NodeKind::Mesh(MeshNode::new(mesh));

        let node = match self.pool.pop() {
            Some(node) if graph.contains(node) => {
                if let Some(slot) = graph.kind_mut(node) {
                    *slot = kind;
                }
                graph.set_visible(node, true);
                node
            }
            _ => match graph.spawn(self.emitter, "particle", kind) {
                Ok(node) => node,
                Err(e) => {
                    log::warn!("Could not spawn particle: {}", e);
                    return None;
                }
            },
        };

        let particle = Particle {
            node,
            start_position,
            end_position: start_position + Vector3::new(0.0, rise, 0.0),
            start_scale,
            end_scale: 0.0,
            start_rotation,
            end_rotation,
            lifetime,
            elapsed: 0.0,
        };
        graph.set_transform(node, particle.transform());
        self.particles.push(particle);
        Some(node)
    }

    /// Moves every live particle forward by `dt`, retiring the expired ones.
    pub fn advance(&mut self, graph: &mut SceneGraph, dt: f32) {
        let mut retired = Vec::new();
        self.particles.retain_mut(|particle| {
            if particle.advance(dt) {
                retired.push(particle.node);
                return false;
            }
            graph.set_transform(particle.node, particle.transform());
            true
        });
        for node in retired {
            graph.set_visible(node, false);
            self.pool.push(node);
        }
    }
}

impl Animator for ParticleSystem {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32) {
        if self.config.toggle_key.is_some_and(|key| input.was_pressed(key)) {
            self.active = !self.active;
        }
        self.timer += dt;
        self.advance(graph, dt);
        if self.active && self.timer > self.config.spawn_interval {
            self.timer = 0.0;
            self.spawn(graph);
        }
    }
}
