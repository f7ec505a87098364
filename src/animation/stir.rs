//! A prop (the cauldron spoon) that hovers at rest and stirs in circles on demand.

use std::f32::consts::PI;

use cgmath::Vector3;
use winit::keyboard::KeyCode;

use crate::{
    animation::{Animator, mix_vec3},
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StirState {
    Resting,
    RestToMove,
    Moving,
    MoveToRest,
}

#[derive(Clone, Debug)]
pub struct StirConfig {
    pub transition_time: f32,
    pub rest_center: Vector3<f32>,
    pub rest_hover_amplitude: f32,
    pub rest_hover_frequency: f32,
    /// Half turns per second of the resting spin.
    pub rest_spin_frequency: f32,
    pub move_center: Vector3<f32>,
    pub move_hover_amplitude: f32,
    pub move_hover_frequency: f32,
    pub move_radius: f32,
    /// Half turns per second around the move center.
    pub move_frequency: f32,
    pub toggle_key: Option<KeyCode>,
}

impl Default for StirConfig {
    fn default() -> Self {
        Self {
            transition_time: 0.5,
            rest_center: Vector3::new(0.0, 9.0, 0.0),
            rest_hover_amplitude: 0.6,
            rest_hover_frequency: 1.0,
            rest_spin_frequency: 0.5,
            move_center: Vector3::new(0.0, 6.0, 0.0),
            move_hover_amplitude: 1.0,
            move_hover_frequency: 3.0,
            move_radius: 1.0,
            move_frequency: 2.0,
            toggle_key: Some(KeyCode::KeyH),
        }
    }
}

/// Position and Euler rotation of the prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

pub struct StirringProp {
    node: NodeId,
    config: StirConfig,
    state: StirState,
    time: f32,
    state_time: f32,
    toggle_requested: bool,
}

impl StirringProp {
    pub fn new(node: NodeId, config: StirConfig) -> Self {
        Self {
            node,
            config,
            state: StirState::Resting,
            time: 0.0,
            state_time: 0.0,
            toggle_requested: false,
        }
    }

    pub fn state(&self) -> StirState {
        self.state
    }

    pub fn state_time(&self) -> f32 {
        self.state_time
    }

    /// Queues a toggle edge for the next update.
    pub fn request_toggle(&mut self) {
        self.toggle_requested = true;
    }

    pub fn rest_pose(&self) -> Pose {
        let c = &self.config;
        let hover = c.rest_hover_amplitude * (self.time * c.rest_hover_frequency).sin();
        let yaw = ((self.time * c.rest_spin_frequency) % 2.0) * PI;
        Pose {
            position: c.rest_center + Vector3::new(0.0, hover, 0.0),
            rotation: Vector3::new(0.0, yaw, 0.0),
        }
    }

    pub fn move_pose(&self) -> Pose {
        let c = &self.config;
        let angle = ((self.time * c.move_frequency) % 2.0) * PI;
        let hover = c.move_hover_amplitude * (self.time * c.move_hover_frequency).sin();
        let offset = Vector3::new(
            c.move_radius * angle.sin(),
            hover,
            c.move_radius * angle.cos(),
        );
        Pose {
            position: c.move_center + offset,
            rotation: Vector3::new(0.0, angle, 0.0),
        }
    }

    pub fn pose(&self) -> Pose {
        let progress = (self.state_time / self.config.transition_time).clamp(0.0, 1.0);
        let blend = |from: Pose, to: Pose| Pose {
            position: mix_vec3(from.position, to.position, progress),
            rotation: mix_vec3(from.rotation, to.rotation, progress),
        };
        match self.state {
            StirState::Resting => self.rest_pose(),
            StirState::Moving => self.move_pose(),
            StirState::RestToMove => blend(self.rest_pose(), self.move_pose()),
            StirState::MoveToRest => blend(self.move_pose(), self.rest_pose()),
        }
    }

    fn enter(&mut self, state: StirState) {
        log::debug!("Stirring prop {:?} -> {:?}", self.state, state);
        self.state = state;
        self.state_time = 0.0;
    }

    /// Advances the state machine without touching the scene graph.
    pub fn step(&mut self, toggled: bool, dt: f32) {
        self.time += dt;
        self.state_time += dt;
        match self.state {
            StirState::Resting if toggled => self.enter(StirState::RestToMove),
            StirState::Moving if toggled => self.enter(StirState::MoveToRest),
            StirState::RestToMove | StirState::MoveToRest => {
                if toggled {
                    log::debug!("Toggle ignored while the prop is in transition");
                }
                if self.state_time >= self.config.transition_time {
                    let next = match self.state {
                        StirState::RestToMove => StirState::Moving,
                        _ => StirState::Resting,
                    };
                    self.enter(next);
                }
            }
            _ => {}
        }
    }
}

impl Animator for StirringProp {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32) {
        let from_key = self
            .config
            .toggle_key
            .is_some_and(|key| input.was_pressed(key));
        let toggled = std::mem::take(&mut self.toggle_requested) || from_key;
        self.step(toggled, dt);

        let pose = self.pose();
        graph.set_position(self.node, pose.position);
        graph.set_rotation(self.node, pose.rotation);
    }
}
