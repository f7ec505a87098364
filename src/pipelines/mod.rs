//! Shader programs and the render-API seam.
//!
//! The engine never talks to a graphics backend directly. Everything that
//! touches GPU state goes through [`RenderApi`], which a backend (or a
//! recording mock in tests) implements. Uniforms are addressed by name, the
//! same names the bundled shaders declare.

use std::path::Path;

use cgmath::{Matrix4, Vector3};

pub mod basic;
pub mod light;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Creates textures from image files. Decoding is the implementor's business.
pub trait TextureLoader {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureHandle>;
    fn destroy_texture(&mut self, texture: TextureHandle);
}

pub trait RenderApi: TextureLoader {
    fn create_program(&mut self, desc: &basic::ProgramDesc) -> anyhow::Result<ProgramHandle>;
    fn use_program(&mut self, program: ProgramHandle);

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>);
    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        contents: &[u8],
        layout: &wgpu::VertexBufferLayout<'static>,
    ) -> anyhow::Result<BufferHandle>;
    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> anyhow::Result<BufferHandle>;
    fn destroy_buffer(&mut self, buffer: BufferHandle);

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle);
    fn bind_texture(&mut self, texture: TextureHandle);
    fn set_backface_culling(&mut self, enabled: bool);
    /// Switches every following draw between line and filled polygons.
    fn set_wireframe(&mut self, enabled: bool);
    /// Draws `count` indices of `index_buffer` as a triangle list.
    fn draw_indexed(&mut self, index_buffer: BufferHandle, count: u32);
}
