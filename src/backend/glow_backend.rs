//! OpenGL backend implementation via glow

use std::collections::HashMap;

use glam::{Mat4, Vec3, Vec4};
use glow::HasContext;

use super::error::{BackendError, BackendResult};
use super::traits::GpuContext;
use super::types::*;

// From GL_EXT_texture_filter_anisotropic; not part of the core registry
// glow generates its constants from.
const MAX_TEXTURE_MAX_ANISOTROPY_EXT: u32 = 0x84FF;

/// OpenGL implementation of [`GpuContext`].
///
/// Owns every GL object it hands a handle out for. GL objects are not
/// deleted individually: destroying the underlying GL context invalidates
/// all of them at once, which is the crate's teardown model.
pub struct GlowContext {
    gl: glow::Context,

    buffers: HashMap<u64, glow::Buffer>,
    layouts: HashMap<u64, glow::VertexArray>,
    textures: HashMap<u64, glow::Texture>,
    programs: HashMap<u64, glow::Program>,

    // Uniform lookups are cached per (program, name); GL location queries
    // are driver round trips and the renderer repeats them every frame.
    uniform_lookup: HashMap<(u64, String), Option<u64>>,
    uniform_locations: HashMap<u64, glow::UniformLocation>,

    next_id: u64,
    max_anisotropy: i32,
}

impl GlowContext {
    /// Wrap an already-current GL context.
    pub fn new(gl: glow::Context) -> Self {
        let max_anisotropy = if gl
            .supported_extensions()
            .contains("GL_EXT_texture_filter_anisotropic")
        {
            unsafe { gl.get_parameter_i32(MAX_TEXTURE_MAX_ANISOTROPY_EXT) }
        } else {
            log::warn!("GL_EXT_texture_filter_anisotropic is not supported");
            0
        };

        unsafe {
            log::info!("OpenGL version: {}", gl.get_parameter_string(glow::VERSION));
            log::info!("OpenGL vendor: {}", gl.get_parameter_string(glow::VENDOR));
        }

        Self {
            gl,
            buffers: HashMap::new(),
            layouts: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            uniform_lookup: HashMap::new(),
            uniform_locations: HashMap::new(),
            next_id: 0,
            max_anisotropy,
        }
    }

    /// Register a linked program owned by the material provider.
    pub fn register_program(&mut self, program: glow::Program) -> ProgramHandle {
        self.next_id += 1;
        self.programs.insert(self.next_id, program);
        ProgramHandle(self.next_id)
    }

    /// Register a texture owned by the material provider.
    pub fn register_texture(&mut self, texture: glow::Texture) -> TextureHandle {
        self.next_id += 1;
        self.textures.insert(self.next_id, texture);
        TextureHandle(self.next_id)
    }

    /// Direct access to the underlying GL context, for collaborators that
    /// create their own objects (shader compilation, texture upload).
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn gl_scalar(scalar: ScalarType) -> u32 {
        match scalar {
            ScalarType::Float32 => glow::FLOAT,
            ScalarType::Float16 => glow::HALF_FLOAT,
            ScalarType::Uint8 => glow::UNSIGNED_BYTE,
            ScalarType::Uint16 => glow::UNSIGNED_SHORT,
            ScalarType::Uint32 => glow::UNSIGNED_INT,
            ScalarType::Int16 => glow::SHORT,
        }
    }

    fn gl_index_type(format: IndexFormat) -> u32 {
        match format {
            IndexFormat::Uint16 => glow::UNSIGNED_SHORT,
            IndexFormat::Uint32 => glow::UNSIGNED_INT,
        }
    }

    fn gl_topology(topology: PrimitiveTopology) -> u32 {
        match topology {
            PrimitiveTopology::TriangleList => glow::TRIANGLES,
        }
    }
}

impl GpuContext for GlowContext {
    fn max_anisotropy(&self) -> i32 {
        self.max_anisotropy
    }

    fn configure(&mut self, clear_color: [f32; 4]) {
        unsafe {
            self.gl.enable(glow::CULL_FACE);
            self.gl.enable(glow::DEPTH_TEST);
            let [r, g, b, a] = clear_color;
            self.gl.clear_color(r, g, b, a);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(0, 0, width as i32, height as i32);
        }
    }

    fn clear(&mut self) {
        unsafe {
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn create_buffer(&mut self, kind: BufferKind, data: &[u8]) -> BackendResult<BufferHandle> {
        let target = match kind {
            BufferKind::Vertex => glow::ARRAY_BUFFER,
            BufferKind::Index => glow::ELEMENT_ARRAY_BUFFER,
        };
        let buffer = unsafe { self.gl.create_buffer() }.map_err(BackendError::BufferCreationFailed)?;
        unsafe {
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            self.gl.bind_buffer(target, None);
        }
        self.next_id += 1;
        self.buffers.insert(self.next_id, buffer);
        Ok(BufferHandle(self.next_id))
    }

    fn begin_vertex_layout(
        &mut self,
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
    ) -> BackendResult<VertexLayoutHandle> {
        let layout = unsafe { self.gl.create_vertex_array() }
            .map_err(BackendError::LayoutCreationFailed)?;
        let vertex = self.buffers.get(&vertex_buffer.0).copied();
        let index = self.buffers.get(&index_buffer.0).copied();
        unsafe {
            self.gl.bind_vertex_array(Some(layout));
            self.gl.bind_buffer(glow::ARRAY_BUFFER, vertex);
            self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, index);
        }
        self.next_id += 1;
        self.layouts.insert(self.next_id, layout);
        Ok(VertexLayoutHandle(self.next_id))
    }

    fn bind_attribute(
        &mut self,
        location: u32,
        pointer: AttributePointer,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl.enable_vertex_attrib_array(location);
            match pointer {
                AttributePointer::Float {
                    components,
                    scalar,
                    normalized,
                } => self.gl.vertex_attrib_pointer_f32(
                    location,
                    components,
                    Self::gl_scalar(scalar),
                    normalized,
                    stride,
                    offset,
                ),
                AttributePointer::Integer { components, scalar } => self
                    .gl
                    .vertex_attrib_pointer_i32(
                        location,
                        components,
                        Self::gl_scalar(scalar),
                        stride,
                        offset,
                    ),
            }
        }
    }

    fn end_vertex_layout(&mut self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    fn attribute_location(&mut self, program: ProgramHandle, name: &str) -> Option<u32> {
        let program = self.programs.get(&program.0)?;
        unsafe { self.gl.get_attrib_location(*program, name) }
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let key = (program.0, name.to_string());
        if let Some(cached) = self.uniform_lookup.get(&key) {
            return cached.map(UniformLocation);
        }
        let native = self
            .programs
            .get(&program.0)
            .and_then(|program| unsafe { self.gl.get_uniform_location(*program, name) });
        let id = native.map(|location| {
            self.next_id += 1;
            self.uniform_locations.insert(self.next_id, location);
            self.next_id
        });
        self.uniform_lookup.insert(key, id);
        id.map(UniformLocation)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        let program = self.programs.get(&program.0).copied();
        unsafe {
            self.gl.use_program(program);
        }
    }

    fn bind_vertex_layout(&mut self, layout: VertexLayoutHandle) {
        let layout = self.layouts.get(&layout.0).copied();
        unsafe {
            self.gl.bind_vertex_array(layout);
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        let texture = self.textures.get(&texture.0).copied();
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, texture);
        }
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if let Some(location) = self.uniform_locations.get(&location.0) {
            unsafe {
                self.gl
                    .uniform_matrix_4_f32_slice(Some(location), false, &value.to_cols_array());
            }
        }
    }

    fn set_uniform_vec3(&mut self, location: UniformLocation, value: Vec3) {
        if let Some(location) = self.uniform_locations.get(&location.0) {
            unsafe {
                self.gl.uniform_3_f32(Some(location), value.x, value.y, value.z);
            }
        }
    }

    fn set_uniform_vec4(&mut self, location: UniformLocation, value: Vec4) {
        if let Some(location) = self.uniform_locations.get(&location.0) {
            unsafe {
                self.gl
                    .uniform_4_f32(Some(location), value.x, value.y, value.z, value.w);
            }
        }
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        if let Some(location) = self.uniform_locations.get(&location.0) {
            unsafe {
                self.gl.uniform_1_f32(Some(location), value);
            }
        }
    }

    fn set_uniform_i32(&mut self, location: UniformLocation, value: i32) {
        if let Some(location) = self.uniform_locations.get(&location.0) {
            unsafe {
                self.gl.uniform_1_i32(Some(location), value);
            }
        }
    }

    fn draw_indexed(
        &mut self,
        topology: PrimitiveTopology,
        index_count: i32,
        format: IndexFormat,
        byte_offset: i32,
    ) {
        unsafe {
            self.gl.draw_elements(
                Self::gl_topology(topology),
                index_count,
                Self::gl_index_type(format),
                byte_offset,
            );
        }
    }
}
