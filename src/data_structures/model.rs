//! GPU-ready mesh data: interleaved vertices and per-material index lists.

use crate::{
    data_structures::material::{Material, MaterialLibrary},
    pipelines::BufferHandle,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One deduplicated corner: position, texture coordinate and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

/**
 * Stride layout: position (vec3) + uv (vec2) + normal (vec3), tightly packed.
 *
 * Models without `vn` lines get a zero normal; shaders fall back to
 * ambient-only lighting for them.
 */
impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Triangles of one mesh sharing a material.
#[derive(Clone, Debug)]
pub struct SubMesh {
    /// Name used by `usemtl`, empty for faces outside any `usemtl`.
    pub material_name: String,
    /// What that name resolved to, possibly the library fallback.
    pub material: Material,
    pub indices: Vec<u32>,
    pub index_buffer: BufferHandle,
}

impl SubMesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// An uploaded, immutable model shared by every node that displays it.
#[derive(Clone, Debug)]
pub struct MeshAsset {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub vertex_buffer: BufferHandle,
    /// In first-use order of their material.
    pub submeshes: Vec<SubMesh>,
    pub library: MaterialLibrary,
}

impl MeshAsset {
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len() / 3).sum()
    }

    pub fn submesh(&self, material_name: &str) -> Option<&SubMesh> {
        self.submeshes
            .iter()
            .find(|s| s.material_name == material_name)
    }
}
