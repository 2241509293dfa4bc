//! The GPU operations the bootstrap sequence issues.
//!
//! [`Backend`] is deliberately narrow: it covers object creation, shader
//! compilation and linking, vertex layout and a single draw. [`gl::Gl`]
//! forwards to a live OpenGL context; `recording::Recording`, behind the
//! `recording` feature, validates and records the calls without one.

use std::fmt;

pub mod gl;
#[cfg(any(test, feature = "recording"))]
pub mod recording;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
}

/// Float attribute description, in bytes where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub index: u32,
    pub components: u32,
    pub stride: u32,
    pub offset: u32,
}

pub trait Backend {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Sets the source and compiles. On failure returns the info log.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String>;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    /// Attaches `shaders`, binds each `(index, name)` attribute, links, then
    /// detaches the shaders again. On failure returns the info log.
    fn link_program(
        &self,
        program: Self::Program,
        shaders: &[Self::Shader],
        attributes: &[(u32, &str)],
    ) -> Result<(), String>;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Binds `buffer` as the array buffer and fills it with static data.
    fn upload_array_buffer(&self, buffer: Self::Buffer, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    /// Describes a float attribute sourced from the bound array buffer and
    /// enables it on the bound vertex array.
    fn vertex_attribute(&self, layout: &AttributeLayout);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn clear(&self, color: [f32; 4]);
    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32);
}
