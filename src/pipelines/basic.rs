use crate::{
    camera::CameraUniforms,
    data_structures::{
        material::ShadingVariant,
        model::{ModelVertex, Vertex},
    },
    pipelines::{ProgramHandle, RenderApi},
};

/// Vertex and fragment shader text of one program.
#[derive(Clone, Debug, Default)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// Shader text for the lit and unlit programs. `LitBackface` reuses the lit shaders.
#[derive(Clone, Debug, Default)]
pub struct ShaderSources {
    pub lit: ShaderSource,
    pub unlit: ShaderSource,
}

/// Everything a backend needs to build one program.
#[derive(Clone, Debug)]
pub struct ProgramDesc {
    pub label: &'static str,
    pub variant: ShadingVariant,
    pub shader: ShaderSource,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub primitive: wgpu::PrimitiveState,
}

impl ProgramDesc {
    pub fn new(variant: ShadingVariant, shader: ShaderSource) -> Self {
        Self {
            label: label_of(variant),
            variant,
            shader,
            vertex_layout: ModelVertex::desc(),
            primitive: primitive_state(variant),
        }
    }
}

fn label_of(variant: ShadingVariant) -> &'static str {
    match variant {
        ShadingVariant::Lit => "Lit Program",
        ShadingVariant::LitBackface => "Lit Backface Program",
        ShadingVariant::Unlit => "Unlit Program",
    }
}

/// Triangle lists, counter clockwise front faces; back faces culled except for `LitBackface`.
pub fn primitive_state(variant: ShadingVariant) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: match variant {
            ShadingVariant::LitBackface => None,
            _ => Some(wgpu::Face::Back),
        },
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// One program per shading variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramSet {
    pub lit: ProgramHandle,
    pub lit_backface: ProgramHandle,
    pub unlit: ProgramHandle,
}

impl ProgramSet {
    pub fn create(api: &mut dyn RenderApi, sources: &ShaderSources) -> anyhow::Result<Self> {
        let lit = api.create_program(&ProgramDesc::new(ShadingVariant::Lit, sources.lit.clone()))?;
        let lit_backface = api.create_program(&ProgramDesc::new(
            ShadingVariant::LitBackface,
            sources.lit.clone(),
        ))?;
        let unlit =
            api.create_program(&ProgramDesc::new(ShadingVariant::Unlit, sources.unlit.clone()))?;
        log::debug!("Created lit, lit backface and unlit programs");
        Ok(Self {
            lit,
            lit_backface,
            unlit,
        })
    }

    pub fn get(&self, variant: ShadingVariant) -> ProgramHandle {
        match variant {
            ShadingVariant::Lit => self.lit,
            ShadingVariant::LitBackface => self.lit_backface,
            ShadingVariant::Unlit => self.unlit,
        }
    }
}

/// Uploads `view` and `projection`, plus `viewPos` for programs that do specular lighting.
pub fn set_camera_uniforms(api: &mut dyn RenderApi, camera: &CameraUniforms, variant: ShadingVariant) {
    api.set_mat4("view", &camera.view);
    api.set_mat4("projection", &camera.projection);
    if variant.is_lit() {
        api.set_vec3("viewPos", camera.eye);
    }
}
