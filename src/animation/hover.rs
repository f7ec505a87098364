//! A figure (the fire elemental) bobbing up and down around the height it had
//! when hovering started.

use crate::{
    animation::Animator,
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

#[derive(Clone, Debug)]
pub struct HoverConfig {
    pub amplitude: f32,
    /// Bobs per second are `frequency / π`; zero or below means standing still.
    pub frequency: f32,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.15,
            frequency: 1.0,
        }
    }
}

pub struct HoverMotion {
    node: NodeId,
    config: HoverConfig,
    anchor: Option<f32>,
    time: f32,
}

impl HoverMotion {
    pub fn new(node: NodeId, config: HoverConfig) -> Self {
        Self {
            node,
            config,
            anchor: None,
            time: 0.0,
        }
    }

    pub fn is_hovering(&self) -> bool {
        self.config.frequency > 0.0
    }

    /// Height the motion oscillates around, known after the first hovering update.
    pub fn anchor(&self) -> Option<f32> {
        self.anchor
    }

    /// Vertical offset from the anchor at the current time.
    pub fn offset(&self) -> f32 {
        (self.time * self.config.frequency * 2.0).sin() * self.config.amplitude
    }

    /// Changes the speed. Stopping freezes the figure where it is and the
    /// next start anchors at that height.
    pub fn set_frequency(&mut self, frequency: f32) {
        if frequency <= 0.0 {
            self.anchor = None;
        }
        self.config.frequency = frequency;
    }
}

impl Animator for HoverMotion {
    fn update(&mut self, graph: &mut SceneGraph, _input: &Input, dt: f32) {
        if !self.is_hovering() {
            return;
        }
        let Some(mut position) = graph.transform(self.node).map(|t| t.position) else {
            return;
        };
        let anchor = *self.anchor.get_or_insert(position.y);
        self.time += dt;
        position.y = anchor + self.offset();
        graph.set_position(self.node, position);
    }
}
