//! GPU buffer upload
//!
//! Turns a mesh source's raw byte buffers into GPU buffers, one per entry,
//! preserving input order. Must run on the context-owning thread (contexts
//! are not `Send`).

use crate::backend::{BackendResult, BufferHandle, BufferKind, GpuContext};
use crate::scene::MeshSource;

/// Upload all of a mesh source's vertex and index buffers.
///
/// Returns the handle arrays in input order. Any single failure aborts the
/// whole upload; a partially uploaded mesh is never handed back.
pub fn upload_mesh_buffers<C: GpuContext>(
    ctx: &mut C,
    source: &MeshSource,
) -> BackendResult<(Vec<BufferHandle>, Vec<BufferHandle>)> {
    let mut vertex_handles = Vec::with_capacity(source.vertex_buffers.len());
    for buffer in &source.vertex_buffers {
        vertex_handles.push(ctx.create_buffer(BufferKind::Vertex, &buffer.data)?);
    }

    let mut index_handles = Vec::with_capacity(source.index_buffers.len());
    for buffer in &source.index_buffers {
        index_handles.push(ctx.create_buffer(BufferKind::Index, &buffer.data)?);
    }

    log::debug!(
        "uploaded {} vertex and {} index buffers",
        vertex_handles.len(),
        index_handles.len()
    );
    Ok((vertex_handles, index_handles))
}
