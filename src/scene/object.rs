//! Mesh objects and draw calls
//!
//! A [`MeshObject`] enters the system carrying its transient [`MeshSource`];
//! [`MeshObject::build_draw_calls`] converts that source into GPU-ready
//! [`DrawCall`]s and releases it. After load a mesh object holds only draw
//! state and the GPU handle arrays its draw calls reference.

use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};

use crate::backend::{
    build_vertex_layout, BufferHandle, GpuContext, IndexFormat, PrimitiveTopology,
    VertexLayoutHandle,
};
use crate::error::{FormatError, LoadError};
use crate::resources::{upload_mesh_buffers, Material, MaterialResolver, Shader};

use super::source::{draw_call_entries, parse_draw_call, scene_objects, BufferRef, MeshSource};

/// One GPU draw command's worth of state.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub primitive_type: PrimitiveTopology,
    pub material: Arc<Material>,
    pub shader: Arc<Shader>,
    pub vertex_buffer: BufferHandle,
    pub vertex_buffer_offset: u32,
    pub index_buffer: BufferHandle,
    pub index_buffer_offset: u32,
    pub base_vertex: u32,
    pub vertex_count: u32,
    /// Start offset into the index buffer in bytes (start index times the
    /// index element size).
    pub start_index_bytes: u32,
    pub index_count: i32,
    pub index_format: IndexFormat,
    /// Per-draw-call tint; entries without one upload a zero vector.
    pub tint_color: Option<Vec3>,
    /// Exclusively owned layout object, created once at load.
    pub vertex_layout: VertexLayoutHandle,
}

/// A renderable mesh instance.
pub struct MeshObject {
    pub transform: Mat4,
    pub tint_color: Vec4,
    /// Positional material overrides supplied with the mesh instance; when
    /// non-empty, entry `i` replaces the material of draw call `i` within
    /// each scene object.
    pub skin_materials: Vec<String>,
    draw_calls: Vec<DrawCall>,
    vertex_buffers: Vec<BufferHandle>,
    index_buffers: Vec<BufferHandle>,
    source: Option<MeshSource>,
}

impl MeshObject {
    pub fn new(source: MeshSource) -> Self {
        Self {
            transform: Mat4::IDENTITY,
            tint_color: Vec4::ONE,
            skin_materials: Vec::new(),
            draw_calls: Vec::new(),
            vertex_buffers: Vec::new(),
            index_buffers: Vec::new(),
            source: Some(source),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_tint_color(mut self, tint: Vec4) -> Self {
        self.tint_color = tint;
        self
    }

    pub fn with_skin_materials(mut self, materials: Vec<String>) -> Self {
        self.skin_materials = materials;
        self
    }

    /// The built draw calls, material-sorted within this object.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Upload-time vertex buffer handles, in source order.
    pub fn vertex_buffers(&self) -> &[BufferHandle] {
        &self.vertex_buffers
    }

    /// Upload-time index buffer handles, in source order.
    pub fn index_buffers(&self) -> &[BufferHandle] {
        &self.index_buffers
    }

    /// The still-unconsumed scene source, if draw calls have not been built.
    pub(crate) fn source(&self) -> Option<&MeshSource> {
        self.source.as_ref()
    }

    fn resolve_buffer(
        handles: &[BufferHandle],
        reference: BufferRef,
        kind: &'static str,
    ) -> Result<BufferHandle, FormatError> {
        handles
            .get(reference.index)
            .copied()
            .ok_or(FormatError::BufferIndexOutOfRange {
                kind,
                index: reference.index,
                count: handles.len(),
            })
    }

    /// Build this object's draw calls: upload buffers, walk the scene-object
    /// tree in order, resolve materials, create vertex layouts, then
    /// stable-sort the calls by material name to cut state churn. Releases
    /// the scene source on success. A second call is a no-op.
    pub fn build_draw_calls<C, R>(
        &mut self,
        ctx: &mut C,
        resolver: &mut R,
        max_anisotropy: i32,
    ) -> Result<(), LoadError>
    where
        C: GpuContext,
        R: MaterialResolver + ?Sized,
    {
        let Some(source) = self.source.take() else {
            return Ok(());
        };

        let (vertex_handles, index_handles) = upload_mesh_buffers(ctx, &source)?;

        for scene_object in scene_objects(&source.scene)? {
            for (position, entry) in draw_call_entries(scene_object)?.iter().enumerate() {
                let parsed = parse_draw_call(entry)?;

                let material_name = if self.skin_materials.is_empty() {
                    parsed.material
                } else {
                    self.skin_materials.get(position).cloned().ok_or(
                        FormatError::SkinTableTooShort {
                            table: self.skin_materials.len(),
                            index: position,
                        },
                    )?
                };

                let vertex_source = source
                    .vertex_buffers
                    .get(parsed.vertex_buffer.index)
                    .ok_or(FormatError::BufferIndexOutOfRange {
                        kind: "vertex",
                        index: parsed.vertex_buffer.index,
                        count: source.vertex_buffers.len(),
                    })?;
                let index_source = source
                    .index_buffers
                    .get(parsed.index_buffer.index)
                    .ok_or(FormatError::BufferIndexOutOfRange {
                        kind: "index",
                        index: parsed.index_buffer.index,
                        count: source.index_buffers.len(),
                    })?;

                let index_format = IndexFormat::from_element_size(index_source.element_size)?;
                let vertex_buffer =
                    Self::resolve_buffer(&vertex_handles, parsed.vertex_buffer, "vertex")?;
                let index_buffer =
                    Self::resolve_buffer(&index_handles, parsed.index_buffer, "index")?;

                let (material, shader) = resolver.resolve(&material_name, max_anisotropy)?;

                let vertex_layout = build_vertex_layout(
                    ctx,
                    shader.program,
                    &vertex_source.attributes,
                    vertex_source.stride,
                    vertex_buffer,
                    index_buffer,
                )?;

                self.draw_calls.push(DrawCall {
                    primitive_type: parsed.topology,
                    material,
                    shader,
                    vertex_buffer,
                    vertex_buffer_offset: parsed.vertex_buffer.offset,
                    index_buffer,
                    index_buffer_offset: parsed.index_buffer.offset,
                    base_vertex: parsed.base_vertex,
                    vertex_count: parsed.vertex_count,
                    start_index_bytes: parsed.start_index * index_format.size(),
                    index_count: parsed.index_count,
                    index_format,
                    tint_color: parsed.tint,
                    vertex_layout,
                });
            }
        }

        self.vertex_buffers = vertex_handles;
        self.index_buffers = index_handles;

        // Vec::sort_by is stable, so equal material names keep their
        // enumeration order.
        self.draw_calls
            .sort_by(|a, b| a.material.name.cmp(&b.material.name));

        Ok(())
    }
}
