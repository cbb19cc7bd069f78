//! Dummy GPU backend for testing and development.
//!
//! This backend performs no GPU work. Shader introspection is configured up
//! front ([`DummyContext::create_program`] declares the attribute and uniform
//! names a program exposes) and every command is appended to a call log that
//! tests inspect.

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};

use super::error::BackendResult;
use super::traits::GpuContext;
use super::types::*;

/// One recorded context command.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    Configure {
        clear_color: [f32; 4],
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    Clear,
    CreateBuffer {
        kind: BufferKind,
        size: usize,
    },
    BeginVertexLayout {
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
    },
    BindAttribute {
        location: u32,
        pointer: AttributePointer,
        stride: i32,
        offset: i32,
    },
    EndVertexLayout,
    UseProgram(ProgramHandle),
    BindVertexLayout(VertexLayoutHandle),
    BindTexture {
        unit: u32,
        texture: TextureHandle,
    },
    SetUniform {
        name: String,
        value: UniformValue,
    },
    DrawIndexed {
        topology: PrimitiveTopology,
        index_count: i32,
        format: IndexFormat,
        byte_offset: i32,
    },
}

/// Value recorded for a uniform upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec3(Vec3),
    Vec4(Vec4),
    F32(f32),
    I32(i32),
}

struct ProgramInfo {
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

/// Dummy GPU context.
#[derive(Default)]
pub struct DummyContext {
    next_id: u64,
    programs: HashMap<u64, ProgramInfo>,
    // Uniform location handles are interned per (program, name) so repeated
    // lookups stay stable across frames, mirroring real drivers.
    uniform_lookup: HashMap<(u64, String), u64>,
    uniform_names: HashMap<u64, String>,
    max_anisotropy: i32,
    calls: Vec<GpuCall>,
}

impl DummyContext {
    /// Create a new dummy context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a program with the given shader input and uniform names.
    ///
    /// Attribute locations are the declaration order within `attributes`.
    pub fn create_program(&mut self, attributes: &[&str], uniforms: &[&str]) -> ProgramHandle {
        self.next_id += 1;
        self.programs.insert(
            self.next_id,
            ProgramInfo {
                attributes: attributes.iter().map(|s| s.to_string()).collect(),
                uniforms: uniforms.iter().map(|s| s.to_string()).collect(),
            },
        );
        ProgramHandle(self.next_id)
    }

    /// Hand out a texture handle.
    pub fn create_texture(&mut self) -> TextureHandle {
        self.next_id += 1;
        TextureHandle(self.next_id)
    }

    /// Override the reported anisotropy capability.
    pub fn set_max_anisotropy(&mut self, value: i32) {
        self.max_anisotropy = value;
    }

    /// The recorded call log, in submission order.
    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Drain the recorded call log.
    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    fn uniform_name(&self, location: UniformLocation) -> String {
        self.uniform_names
            .get(&location.0)
            .cloned()
            .unwrap_or_default()
    }
}

impl GpuContext for DummyContext {
    fn max_anisotropy(&self) -> i32 {
        self.max_anisotropy
    }

    fn configure(&mut self, clear_color: [f32; 4]) {
        log::trace!("DummyContext: configure clear_color={clear_color:?}");
        self.calls.push(GpuCall::Configure { clear_color });
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(GpuCall::SetViewport { width, height });
    }

    fn clear(&mut self) {
        self.calls.push(GpuCall::Clear);
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle> {
        log::trace!("DummyContext: create {kind:?} buffer ({} bytes)", data.len());
        self.next_id += 1;
        self.calls.push(GpuCall::CreateBuffer {
            kind,
            size: data.len(),
        });
        Ok(BufferHandle(self.next_id))
    }

    fn begin_vertex_layout(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
    ) -> BackendResult<VertexLayoutHandle> {
        self.next_id += 1;
        self.calls.push(GpuCall::BeginVertexLayout {
            vertex_buffer,
            index_buffer,
        });
        Ok(VertexLayoutHandle(self.next_id))
    }

    fn bind_attribute(
        &mut self,
        location: u32,
        pointer: AttributePointer,
        stride: i32,
        offset: i32,
    ) {
        self.calls.push(GpuCall::BindAttribute {
            location,
            pointer,
            stride,
            offset,
        });
    }

    fn end_vertex_layout(&mut self) {
        self.calls.push(GpuCall::EndVertexLayout);
    }

    fn attribute_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32> {
        let info = self.programs.get(&program.0)?;
        info.attributes
            .iter()
            .position(|a| a == name)
            .map(|i| i as u32)
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let info = self.programs.get(&program.0)?;
        if !info.uniforms.iter().any(|u| u == name) {
            return None;
        }
        let key = (program.0, name.to_string());
        if let Some(id) = self.uniform_lookup.get(&key) {
            return Some(UniformLocation(*id));
        }
        self.next_id += 1;
        self.uniform_lookup.insert(key, self.next_id);
        self.uniform_names.insert(self.next_id, name.to_string());
        Some(UniformLocation(self.next_id))
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn bind_vertex_layout(&mut self, layout: VertexLayoutHandle) {
        self.calls.push(GpuCall::BindVertexLayout(layout));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.calls.push(GpuCall::BindTexture { unit, texture });
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.calls.push(GpuCall::SetUniform {
            name: self.uniform_name(location),
            value: UniformValue::Mat4(*value),
        });
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3) {
        self.calls.push(GpuCall::SetUniform {
            name: self.uniform_name(location),
            value: UniformValue::Vec3(value),
        });
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.calls.push(GpuCall::SetUniform {
            name: self.uniform_name(location),
            value: UniformValue::Vec4(value),
        });
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        self.calls.push(GpuCall::SetUniform {
            name: self.uniform_name(location),
            value: UniformValue::F32(value),
        });
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        self.calls.push(GpuCall::SetUniform {
            name: self.uniform_name(location),
            value: UniformValue::I32(value),
        });
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: i32,
        format: IndexFormat,
        byte_offset: i32,
    ) {
        self.calls.push(GpuCall::DrawIndexed {
            topology,
            index_count,
            format,
            byte_offset,
        });
    }
}
