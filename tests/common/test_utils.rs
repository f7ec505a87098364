#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use grove_ngin::{
    Matrix4, Vector3,
    data_structures::{
        material::{Material, MaterialLibrary, ShadingVariant},
        model::{MeshAsset, SubMesh},
    },
    pipelines::{
        BufferHandle, ProgramHandle, RenderApi, TextureHandle, TextureLoader, basic::ProgramDesc,
    },
    resources::MemoryAssets,
};

/// One call made against the [`RecordingApi`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    CreateProgram(ShadingVariant),
    UseProgram(ProgramHandle),
    Mat4(String),
    Vec3(String, Vector3<f32>),
    Float(String, f32),
    Int(String, i32),
    CreateVertexBuffer(String, usize),
    CreateIndexBuffer(String, Vec<u32>),
    DestroyBuffer(BufferHandle),
    DestroyTexture(TextureHandle),
    BindVertexBuffer(BufferHandle),
    BindTexture(TextureHandle),
    BackfaceCulling(bool),
    Wireframe(bool),
    Draw(BufferHandle, u32),
    LoadTexture(PathBuf),
}

/// A render API that does nothing but remember what it was asked to do.
#[derive(Default)]
pub(crate) struct RecordingApi {
    pub(crate) calls: Vec<Call>,
    pub(crate) programs: HashMap<ProgramHandle, ShadingVariant>,
    pub(crate) textures: HashMap<PathBuf, TextureHandle>,
    pub(crate) model_matrices: Vec<Matrix4<f32>>,
    next_handle: u32,
}

impl RecordingApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub(crate) fn clear(&mut self) {
        self.calls.clear();
        self.model_matrices.clear();
    }

    /// Names of every uniform uploaded while a program of `variant` was active.
    pub(crate) fn uniforms_for(&self, variant: ShadingVariant) -> Vec<String> {
        let mut active = None;
        let mut names = Vec::new();
        for call in &self.calls {
            match call {
                Call::UseProgram(program) => active = self.programs.get(program).copied(),
                Call::Mat4(name) | Call::Vec3(name, _) | Call::Float(name, _) | Call::Int(name, _)
                    if active == Some(variant) =>
                {
                    names.push(name.clone())
                }
                _ => {}
            }
        }
        names
    }

    /// Variants in the order their programs were activated.
    pub(crate) fn program_order(&self) -> Vec<ShadingVariant> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::UseProgram(program) => self.programs.get(program).copied(),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn draws(&self) -> Vec<(BufferHandle, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(buffer, count) => Some((*buffer, *count)),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }
}

impl TextureLoader for RecordingApi {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureHandle> {
        let handle = TextureHandle(self.handle());
        self.calls.push(Call::LoadTexture(path.to_path_buf()));
        self.textures.insert(path.to_path_buf(), handle);
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::DestroyTexture(texture));
    }
}

impl RenderApi for RecordingApi {
    fn create_program(&mut self, desc: &ProgramDesc) -> anyhow::Result<ProgramHandle> {
        let handle = ProgramHandle(self.handle());
        self.programs.insert(handle, desc.variant);
        self.calls.push(Call::CreateProgram(desc.variant));
        Ok(handle)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(Call::UseProgram(program));
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        if name == "model" {
            self.model_matrices.push(*value);
        }
        self.calls.push(Call::Mat4(name.to_string()));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.calls.push(Call::Vec3(name.to_string(), value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.calls.push(Call::Float(name.to_string(), value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.calls.push(Call::Int(name.to_string(), value));
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
        _layout: &wgpu::VertexBufferLayout<'static>,
    ) -> anyhow::Result<BufferHandle> {
        self.calls
            .push(Call::CreateVertexBuffer(label.to_string(), contents.len()));
        Ok(BufferHandle(self.handle()))
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> anyhow::Result<BufferHandle> {
        self.calls
            .push(Call::CreateIndexBuffer(label.to_string(), indices.to_vec()));
        Ok(BufferHandle(self.handle()))
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(Call::DestroyBuffer(buffer));
    }

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(Call::BindVertexBuffer(buffer));
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn set_backface_culling(&mut self, enabled: bool) {
        self.calls.push(Call::BackfaceCulling(enabled));
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.calls.push(Call::Wireframe(enabled));
    }

    fn draw_indexed(&mut self, index_buffer: BufferHandle, count: u32) {
        self.calls.push(Call::Draw(index_buffer, count));
    }
}

/// A unit cube with one normal per face, so every corner is distinct: 24 vertices, 36 indices.
pub(crate) fn cube_obj(mtllib: Option<&str>, material: Option<&str>) -> String {
    let mut obj = String::new();
    if let Some(lib) = mtllib {
        obj.push_str(&format!("mtllib {}\n", lib));
    }
    obj.push_str(
        "v -1 -1 -1\nv 1 -1 -1\nv 1 1 -1\nv -1 1 -1\n\
         v -1 -1 1\nv 1 -1 1\nv 1 1 1\nv -1 1 1\n\
         vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
         vn 0 0 -1\nvn 0 0 1\nvn -1 0 0\nvn 1 0 0\nvn 0 -1 0\nvn 0 1 0\n",
    );
    if let Some(material) = material {
        obj.push_str(&format!("usemtl {}\n", material));
    }
    obj.push_str(
        "f 1/1/1 4/4/1 3/3/1 2/2/1\n\
         f 5/1/2 6/2/2 7/3/2 8/4/2\n\
         f 1/1/3 5/2/3 8/3/3 4/4/3\n\
         f 2/1/4 3/4/4 7/3/4 6/2/4\n\
         f 1/1/5 2/2/5 6/3/5 5/4/5\n\
         f 4/1/6 8/2/6 7/3/6 3/4/6\n",
    );
    obj
}

pub(crate) fn textured_mtl(name: &str, texture: &str) -> String {
    format!(
        "newmtl {}\nKa 0.2 0.2 0.2\nKd 0.8 0.8 0.8\nKs 0.5 0.5 0.5\nNs 32\nmap_Kd {}\n",
        name, texture
    )
}

/// `cube/cube.obj` with material `wood`, its library and texture.
pub(crate) fn cube_assets() -> MemoryAssets {
    MemoryAssets::new()
        .with("cube/cube.obj", cube_obj(Some("cube.mtl"), Some("wood")))
        .with("cube/cube.mtl", textured_mtl("wood", "wood.png"))
        .with("cube/textures/wood.png", "")
}

/// A single triangle with one named material.
pub(crate) fn triangle_obj(material: &str) -> String {
    format!(
        "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nusemtl {}\nf 1/1 2/2 3/3\n",
        material
    )
}

/// A mesh that was never parsed: one triangle per `(material, variant)` pair, handles counted from `first_handle`.
pub(crate) fn dummy_mesh(name: &str, materials: &[(&str, ShadingVariant)], first_handle: u32) -> Rc<MeshAsset> {
    let submeshes = materials
        .iter()
        .enumerate()
        .map(|(i, (material, variant))| {
            let handle = first_handle + 1 + i as u32;
            SubMesh {
                material_name: material.to_string(),
                material: Material {
                    variant: *variant,
                    ..Material::textured(material, TextureHandle(handle))
                },
                indices: vec![0, 1, 2],
                index_buffer: BufferHandle(handle),
            }
        })
        .collect();
    Rc::new(MeshAsset {
        name: name.to_string(),
        vertices: Vec::new(),
        vertex_buffer: BufferHandle(first_handle),
        submeshes,
        library: MaterialLibrary::new(),
    })
}
