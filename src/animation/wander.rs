//! Aimless drifting inside a rectangular region (the lily pad on its pond).
//!
//! The drifting node must be a direct child of the node whose local XZ
//! plane the region is expressed in, so its position already lives in
//! region space.

use cgmath::{InnerSpace, Vector2, Vector3, Vector4, Zero};
use rand::{Rng, rngs::StdRng};

use crate::{
    animation::Animator,
    data_structures::scene_graph::{NodeId, SceneGraph},
    input::Input,
};

/// Axis aligned rectangle on the local XZ plane, `x` holds X and `y` holds Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfinementRegion {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

impl ConfinementRegion {
    pub fn new(min: Vector2<f32>, max: Vector2<f32>) -> Self {
        Self { min, max }
    }

    pub fn centered(half_extents: Vector2<f32>) -> Self {
        Self::new(-half_extents, half_extents)
    }

    pub fn contains(&self, p: Vector2<f32>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vector2<f32> {
        (self.min + self.max) * 0.5
    }

    /// Inward normal of the border closest to `p` (or most violated by it).
    pub fn nearest_border_normal(&self, p: Vector2<f32>) -> Vector2<f32> {
        let borders = [
            (p.x - self.min.x, Vector2::new(1.0, 0.0)),
            (self.max.x - p.x, Vector2::new(-1.0, 0.0)),
            (p.y - self.min.y, Vector2::new(0.0, 1.0)),
            (self.max.y - p.y, Vector2::new(0.0, -1.0)),
        ];
        borders
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, normal)| normal)
            .unwrap_or_else(|| Vector2::new(1.0, 0.0))
    }
}

/// Mirrors `heading` about the line with unit `normal`, negating its normal component.
pub fn reflect_heading(heading: Vector2<f32>, normal: Vector2<f32>) -> Vector2<f32> {
    heading - normal * (2.0 * heading.dot(normal))
}

pub fn rotate_heading(heading: Vector2<f32>, angle: f32) -> Vector2<f32> {
    let (sin, cos) = angle.sin_cos();
    Vector2::new(
        heading.x * cos - heading.y * sin,
        heading.x * sin + heading.y * cos,
    )
}

#[derive(Clone, Debug)]
pub struct WanderConfig {
    pub speed: f32,
    /// Radians per second around Y.
    pub spin: f32,
    /// Half size of the footprint rectangle in the drifting node's own space.
    pub footprint: Vector2<f32>,
    /// Upper bound of the random turn applied after a bounce, in radians.
    pub max_perturbation: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            speed: 0.5,
            spin: 0.2,
            footprint: Vector2::new(0.5, 0.5),
            max_perturbation: 0.3,
        }
    }
}

pub struct WanderSteering {
    node: NodeId,
    region: ConfinementRegion,
    heading: Vector2<f32>,
    config: WanderConfig,
    rng: StdRng,
}

impl WanderSteering {
    pub fn new(
        node: NodeId,
        region: ConfinementRegion,
        heading: Vector2<f32>,
        config: WanderConfig,
        rng: StdRng,
    ) -> Self {
        let heading = if heading.is_zero() {
            Vector2::new(1.0, 0.0)
        } else {
            heading.normalize()
        };
        Self {
            node,
            region,
            heading,
            config,
            rng,
        }
    }

    pub fn heading(&self) -> Vector2<f32> {
        self.heading
    }

    /// True if all four footprint corners stay inside after moving by `step`.
    fn footprint_fits(&self, graph: &SceneGraph, step: Vector2<f32>) -> bool {
        let Some(mut transform) = graph.transform(self.node) else {
            return false;
        };
        transform.position += Vector3::new(step.x, 0.0, step.y);
        let local = transform.to_matrix();
        let f = self.config.footprint;
        [(-f.x, -f.y), (f.x, -f.y), (f.x, f.y), (-f.x, f.y)]
            .into_iter()
            .map(|(x, z)| local * Vector4::new(x, 0.0, z, 1.0))
            .all(|corner| self.region.contains(Vector2::new(corner.x, corner.z)))
    }

    /**
     * Picks the heading for this frame.
     *
     * A heading that would carry the footprint out of the region is
     * reflected about the nearest border and jittered. If that still
     * leaves the region the node simply heads for the center.
     */
    pub fn steer(&mut self, graph: &SceneGraph, dt: f32) -> Vector2<f32> {
        let distance = self.config.speed * dt;
        if self.footprint_fits(graph, self.heading * distance) {
            return self.heading;
        }
        let Some(transform) = graph.transform(self.node) else {
            return self.heading;
        };
        let position = Vector2::new(transform.position.x, transform.position.z);
        let tentative = position + self.heading * distance;
        let normal = self.region.nearest_border_normal(tentative);

        let mut heading = reflect_heading(self.heading, normal);
        if self.config.max_perturbation > 0.0 {
            let max = self.config.max_perturbation;
            heading = rotate_heading(heading, self.rng.random_range(-max..max));
        }
        if !self.footprint_fits(graph, heading * distance) {
            let to_center = self.region.center() - position;
            if !to_center.is_zero() {
                heading = to_center.normalize();
            }
        }
        self.heading = heading;
        heading
    }
}

impl Animator for WanderSteering {
    fn update(&mut self, graph: &mut SceneGraph, _input: &Input, dt: f32) {
        let heading = self.steer(graph, dt);
        let step = heading * self.config.speed * dt;
        graph.translate(self.node, Vector3::new(step.x, 0.0, step.y));
        if let Some(transform) = graph.transform(self.node) {
            let mut rotation = transform.rotation;
            rotation.y += self.config.spin * dt;
            graph.set_rotation(self.node, rotation);
        }
    }
}
