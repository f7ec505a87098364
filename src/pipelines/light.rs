//! Per-frame collection of light sources and their shader uniforms.

use cgmath::Vector3;

use crate::{
    data_structures::{
        scene_graph::{NodeKind, SceneGraph},
        transform::translation_of,
    },
    pipelines::RenderApi,
};

/// Array length of `lights[]` in the lit shaders.
pub const MAX_LIGHTS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

/// Lights gathered for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LightSnapshot {
    pub ambient: Vector3<f32>,
    pub lights: Vec<PointLight>,
}

impl LightSnapshot {
    /// `ambientLightColor` always, point lights only for lit programs.
    pub fn upload(&self, api: &mut dyn RenderApi, with_point_lights: bool) {
        api.set_vec3("ambientLightColor", self.ambient);
        if !with_point_lights {
            return;
        }
        api.set_int("lightCount", self.lights.len() as i32);
        for (i, light) in self.lights.iter().enumerate() {
            api.set_vec3(&format!("lights[{}].position", i), light.position);
            api.set_vec3(&format!("lights[{}].color", i), light.color);
        }
    }
}

pub struct LightRegistry {
    default_ambient: Vector3<f32>,
    min_ambient: f32,
    max_ambient: f32,
    snapshot: LightSnapshot,
    overflow_reported: bool,
}

impl LightRegistry {
    pub const MIN_AMBIENT: f32 = 0.0;
    pub const MAX_AMBIENT: f32 = 1.5;

    pub fn new(ambient: Vector3<f32>) -> Self {
        let mut registry = Self {
            default_ambient: ambient,
            min_ambient: Self::MIN_AMBIENT,
            max_ambient: Self::MAX_AMBIENT,
            snapshot: LightSnapshot {
                ambient,
                lights: Vec::new(),
            },
            overflow_reported: false,
        };
        registry.set_ambient(ambient);
        registry
    }

    pub fn ambient(&self) -> Vector3<f32> {
        self.snapshot.ambient
    }

    /// Sets the ambient color, clamping each channel into the allowed range.
    pub fn set_ambient(&mut self, color: Vector3<f32>) {
        let clamp = |c: f32| c.clamp(self.min_ambient, self.max_ambient);
        self.snapshot.ambient = Vector3::new(clamp(color.x), clamp(color.y), clamp(color.z));
    }

    pub fn reset_ambient(&mut self) {
        self.set_ambient(self.default_ambient);
    }

    /**
     * Collects every visible light node below the root, in depth-first order.
     *
     * Positions are read from the nodes' world matrices, so this must run
     * after the animators of the frame. Lights beyond [`MAX_LIGHTS`] are
     * dropped.
     */
    pub fn refresh(&mut self, graph: &SceneGraph) -> &LightSnapshot {
        self.snapshot.lights.clear();
        let mut total = 0;
        for (_, node) in graph.visible_depth_first(graph.root()) {
            let NodeKind::Light(light) = &node.kind else {
                continue;
            };
            total += 1;
            if self.snapshot.lights.len() < MAX_LIGHTS {
                self.snapshot.lights.push(PointLight {
                    position: translation_of(node.world()),
                    color: light.color(),
                });
            }
        }
        if total > MAX_LIGHTS && !self.overflow_reported {
            log::warn!(
                "Scene has {} visible lights, only the first {} are used",
                total,
                MAX_LIGHTS
            );
            self.overflow_reported = true;
        }
        &self.snapshot
    }

    pub fn snapshot(&self) -> &LightSnapshot {
        &self.snapshot
    }
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new(Vector3::new(0.3, 0.3, 0.3))
    }
}
