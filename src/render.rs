//! Render dispatch: shading-variant batching of the scene graph.
//!
//! Every frame the graph is walked once, depth first. Each visible mesh node
//! contributes one [`DrawCall`] per shading variant its submeshes resolve
//! to. Buckets are then drawn variant by variant so every program is bound
//! once and receives camera and light uniforms once.
//!
//! # Key types
//!
//! - [`DrawCall`] is one node drawn with one program
//! - [`RenderDispatcher`] owns the programs and the global material multipliers
//! - [`WireframeToggle`] switches polygon mode from input callbacks
//!

use std::{cell::Cell, rc::Rc};

use cgmath::Matrix4;

use crate::{
    camera::CameraUniforms,
    data_structures::{
        editable::EditableValue,
        material::{LightingCoefficients, ShadingVariant},
        model::MeshAsset,
        scene_graph::{NodeId, NodeKind, SceneGraph},
    },
    pipelines::{
        RenderApi,
        basic::{ProgramSet, set_camera_uniforms},
        light::LightSnapshot,
    },
};

/// A node's submeshes that share one shading variant.
#[derive(Clone, Debug)]
pub struct DrawCall {
    pub node: NodeId,
    pub mesh: Rc<MeshAsset>,
    /// Indices into `mesh.submeshes`.
    pub submeshes: Vec<usize>,
    pub variant: ShadingVariant,
    pub world: Matrix4<f32>,
}

/// Draw calls of one frame, one bucket per variant, each in traversal order.
#[derive(Clone, Debug, Default)]
pub struct DrawBuckets {
    pub lit: Vec<DrawCall>,
    pub lit_backface: Vec<DrawCall>,
    pub unlit: Vec<DrawCall>,
}

impl DrawBuckets {
    pub fn get(&self, variant: ShadingVariant) -> &[DrawCall] {
        match variant {
            ShadingVariant::Lit => &self.lit,
            ShadingVariant::LitBackface => &self.lit_backface,
            ShadingVariant::Unlit => &self.unlit,
        }
    }

    fn get_mut(&mut self, variant: ShadingVariant) -> &mut Vec<DrawCall> {
        match variant {
            ShadingVariant::Lit => &mut self.lit,
            ShadingVariant::LitBackface => &mut self.lit_backface,
            ShadingVariant::Unlit => &mut self.unlit,
        }
    }

    pub fn len(&self) -> usize {
        self.lit.len() + self.lit_backface.len() + self.unlit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks the visible part of the graph below the root and buckets its meshes.
pub fn collect_draw_calls(graph: &SceneGraph) -> DrawBuckets {
    let mut buckets = DrawBuckets::default();
    for (id, node) in graph.visible_depth_first(graph.root()) {
        let NodeKind::Mesh(mesh_node) = &node.kind else {
            continue;
        };
        for variant in ShadingVariant::ALL {
            let submeshes: Vec<usize> = mesh_node
                .mesh
                .submeshes
                .iter()
                .enumerate()
                .filter(|(_, sub)| {
                    mesh_node.variant_of(&sub.material_name, sub.material.variant) == variant
                })
                .map(|(idx, _)| idx)
                .collect();
            if submeshes.is_empty() {
                continue;
            }
            buckets.get_mut(variant).push(DrawCall {
                node: id,
                mesh: Rc::clone(&mesh_node.mesh),
                submeshes,
                variant,
                world: *node.world(),
            });
        }
    }
    buckets
}

/// Global sliders applied on top of every material's lighting coefficients.
#[derive(Clone, Debug)]
pub struct MaterialMultipliers {
    pub ka: EditableValue,
    pub kd: EditableValue,
    pub ks: EditableValue,
    pub ns: EditableValue,
}

impl MaterialMultipliers {
    pub fn apply(&self, coefficients: &LightingCoefficients) -> LightingCoefficients {
        LightingCoefficients {
            ka: coefficients.ka * self.ka.value(),
            kd: coefficients.kd * self.kd.value(),
            ks: coefficients.ks * self.ks.value(),
            ns: coefficients.ns * self.ns.value(),
        }
    }

    pub fn reset(&mut self) {
        self.ka.reset();
        self.kd.reset();
        self.ks.reset();
        self.ns.reset();
    }
}

impl Default for MaterialMultipliers {
    fn default() -> Self {
        Self {
            ka: EditableValue::new("ka", 1.0, 0.35, 1.5),
            kd: EditableValue::new("kd", 1.0, 0.35, 1.5),
            ks: EditableValue::new("ks", 1.0, 0.35, 1.5),
            ns: EditableValue::new("ns", 1.0, 0.1, 4.0),
        }
    }
}

/// Counters of the last dispatched frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub draw_calls: usize,
    pub indexed_draws: usize,
}

/// Shared wireframe switch. Clones flip the same state.
#[derive(Clone, Debug, Default)]
pub struct WireframeToggle(Rc<Cell<bool>>);

impl WireframeToggle {
    pub fn is_enabled(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }

    pub fn flip(&self) {
        self.0.set(!self.0.get());
    }
}

pub struct RenderDispatcher {
    programs: ProgramSet,
    pub multipliers: MaterialMultipliers,
    wireframe: WireframeToggle,
    applied_wireframe: bool,
    last_frame: FrameStats,
}

impl RenderDispatcher {
    pub fn new(programs: ProgramSet) -> Self {
        Self {
            programs,
            multipliers: MaterialMultipliers::default(),
            wireframe: WireframeToggle::default(),
            applied_wireframe: false,
            last_frame: FrameStats::default(),
        }
    }

    pub fn programs(&self) -> &ProgramSet {
        &self.programs
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    /// A handle to the wireframe switch, applied at the start of the next dispatch.
    pub fn wireframe(&self) -> WireframeToggle {
        self.wireframe.clone()
    }

    /**
     * Draws the whole graph.
     *
     * Variants are drawn in `Lit`, `LitBackface`, `Unlit` order and empty
     * buckets are skipped. Point lights only reach the lit programs. The
     * polygon mode is only sent to the API when the wireframe switch changed.
     */
    pub fn dispatch(
        &mut self,
        api: &mut dyn RenderApi,
        graph: &SceneGraph,
        camera: &CameraUniforms,
        lights: &LightSnapshot,
    ) -> FrameStats {
        let wireframe = self.wireframe.is_enabled();
        if wireframe != self.applied_wireframe {
            log::debug!("Wireframe {}", if wireframe { "on" } else { "off" });
            api.set_wireframe(wireframe);
            self.applied_wireframe = wireframe;
        }
        let buckets = collect_draw_calls(graph);
        let mut stats = FrameStats::default();
        for variant in ShadingVariant::ALL {
            let calls = buckets.get(variant);
            if calls.is_empty() {
                continue;
            }
            api.use_program(self.programs.get(variant));
            set_camera_uniforms(api, camera, variant);
            lights.upload(api, variant.is_lit());
            let backface = variant == ShadingVariant::LitBackface;
            if backface {
                api.set_backface_culling(false);
            }
            for call in calls {
                stats.indexed_draws += self.draw(api, call);
                stats.draw_calls += 1;
            }
            if backface {
                api.set_backface_culling(true);
            }
        }
        self.last_frame = stats;
        stats
    }

    fn draw(&self, api: &mut dyn RenderApi, call: &DrawCall) -> usize {
        api.set_mat4("model", &call.world);
        api.bind_vertex_buffer(call.mesh.vertex_buffer);
        let mut draws = 0;
        for &idx in &call.submeshes {
            let Some(sub) = call.mesh.submeshes.get(idx) else {
                continue;
            };
            api.bind_texture(sub.material.texture);
            let k = self.multipliers.apply(&sub.material.coefficients);
            api.set_vec3("ka", k.ka);
            api.set_vec3("kd", k.kd);
            api.set_vec3("ks", k.ks);
            api.set_float("ns", k.ns);
            api.draw_indexed(sub.index_buffer, sub.index_count());
            draws += 1;
        }
        draws
    }
}
