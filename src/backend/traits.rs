//! Core backend abstraction trait
//!
//! [`GpuContext`] is the interface every GPU backend implements. A context is
//! an arena: it exclusively owns every buffer, vertex layout, texture and
//! program handle it hands out, and dropping the context invalidates all of
//! them at once. Contexts are not `Send`; every call must happen on the
//! thread that created the context.

use glam::{Mat4, Vec3, Vec4};

use super::error::BackendResult;
use super::types::*;

/// GPU context abstraction.
///
/// Uniform and attribute lookups are name-based and soft-missing: a name the
/// shader does not declare yields `None`, which callers skip silently.
pub trait GpuContext {
    /// Maximum supported texture anisotropy, passed through to the material
    /// provider. Backends without the capability report 0.
    fn max_anisotropy(&self) -> i32;

    /// Apply the fixed render state (depth test, back-face culling) and the
    /// clear color. Called once before any draw command.
    fn configure(&mut self, clear_color: [f32; 4]);

    /// Set the viewport to cover `width` x `height` pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the color and depth buffers.
    fn clear(&mut self);

    /// Allocate a GPU buffer and copy `data` into it.
    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Begin building a vertex layout object bound to the given buffers.
    /// Attribute slots are filled with [`bind_attribute`](Self::bind_attribute)
    /// until [`end_vertex_layout`](Self::end_vertex_layout) seals the object.
    fn begin_vertex_layout(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
    ) -> BackendResult<VertexLayoutHandle>;

    /// Bind one attribute slot of the layout under construction.
    fn bind_attribute(
        &mut self,
        location: u32,
        pointer: AttributePointer,
        stride: i32,
        offset: i32,
    );

    /// Seal the layout under construction.
    fn end_vertex_layout(&mut self);

    /// Location of a named vertex shader input, if the program declares it.
    fn attribute_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32>;

    /// Location of a named uniform, if the program declares it.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    /// Make `program` the active shader program.
    fn use_program(&mut self, program: ProgramHandle);

    /// Bind a sealed vertex layout for drawing.
    fn bind_vertex_layout(&mut self, layout: VertexLayoutHandle);

    /// Bind `texture` to the given texture unit.
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);
    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3);
    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4);
    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);
    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32);

    /// Issue one indexed draw command. `byte_offset` is the start offset into
    /// the bound index buffer in bytes.
    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: i32,
        format: IndexFormat,
        byte_offset: i32,
    );
}
