//! Per-frame behaviors that drive node transforms.
//!
//! Every animator receives the elapsed time of the frame and derives all of
//! its motion from accumulated time, never from a frame count, so it looks
//! the same at any frame rate. Randomized animators take an injected
//! [`rand::rngs::StdRng`] to keep runs reproducible.

use cgmath::Vector3;

use crate::{data_structures::scene_graph::SceneGraph, input::Input};

pub mod croak;
pub mod hop;
pub mod hover;
pub mod orbit;
pub mod particles;
pub mod stir;
pub mod wander;

pub trait Animator {
    fn update(&mut self, graph: &mut SceneGraph, input: &Input, dt: f32);
}

/// `a·(1-t) + b·t`, exact at both `t = 0` and `t = 1`.
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

pub fn mix_vec3(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
    a * (1.0 - t) + b * t
}

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Uniform sample in `[lo, hi)`; degenerate ranges return `lo`.
pub(crate) fn sample_range(rng: &mut impl rand::Rng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
