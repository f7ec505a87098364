//! The frog's croak: head tilts back while the throat sac inflates.

use cgmath::{Deg, Rad, Vector3};
use winit::keyboard::KeyCode;

use crate::{
    animation::{Animator, ease_in_out_cubic, mix, mix_vec3},
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

#[derive(Clone, Debug)]
pub struct CroakConfig {
    /// Seconds from closed to fully open.
    pub length: f32,
    pub head_rotation: (Deg<f32>, Deg<f32>),
    pub head_position: (Vector3<f32>, Vector3<f32>),
    pub throat_scale: (f32, f32),
    pub open_key: KeyCode,
    pub close_key: KeyCode,
}

impl Default for CroakConfig {
    fn default() -> Self {
        Self {
            length: 0.7,
            head_rotation: (Deg(0.0), Deg(60.0)),
            head_position: (Vector3::new(0.0, 0.65, -0.5), Vector3::new(0.0, 0.7, -0.3)),
            throat_scale: (0.0, 0.8),
            open_key: KeyCode::KeyC,
            close_key: KeyCode::KeyV,
        }
    }
}

pub struct CroakPose {
    head: NodeId,
    throat: NodeId,
    config: CroakConfig,
    progress: f32,
}

impl CroakPose {
    pub fn new(head: NodeId, throat: NodeId, config: CroakConfig) -> Self {
        Self {
            head,
            throat,
            config,
            progress: 0.0,
        }
    }

    /// Seconds into the croak, in `[0, length]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Moves the croak forward (or backward for negative `dt`).
    pub fn animate(&mut self, graph: &mut SceneGraph, dt: f32) {
        self.progress = (self.progress + dt).clamp(0.0, self.config.length);
        let t = ease_in_out_cubic(self.progress / self.config.length);
        let c = &self.config;

        let angle: Rad<f32> = Deg(mix(c.head_rotation.0.0, c.head_rotation.1.0, t)).into();
        graph.set_rotation(self.head, Vector3::new(angle.0, 0.0, 0.0));
        graph.set_position(self.head, mix_vec3(c.head_position.0, c.head_position.1, t));
        graph.set_uniform_scale(self.throat, mix(c.throat_scale.0, c.throat_scale.1, t));
    }
}

impl Animator for CroakPose {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32) {
        let direction = input.axis_1d(self.config.open_key, self.config.close_key);
        if direction != 0.0 {
            self.animate(graph, direction * dt);
        }
    }
}
