//! Vertex layout binding
//!
//! Builds one GPU vertex layout object per draw call from the asset's
//! attribute descriptors and the shader's declared inputs.

use std::collections::HashMap;

use super::error::BackendResult;
use super::traits::GpuContext;
use super::types::{BufferHandle, ProgramHandle, VertexAttribute, VertexLayoutHandle};

/// Build a vertex layout for a draw call.
///
/// Shader input names are derived from the attribute semantics: `"v"` +
/// semantic name, with repeated semantics disambiguated by an incrementing
/// numeric suffix from the second occurrence on (`vTEXCOORD`, `vTEXCOORD2`,
/// `vTEXCOORD3`, ...). Attributes the shader does not declare are skipped;
/// shader variants legitimately omit optional inputs.
pub fn build_vertex_layout<C: GpuContext>(
    ctx: &mut C,
    program: ProgramHandle,
    attributes: &[VertexAttribute],
    stride: u32,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
) -> BackendResult<VertexLayoutHandle> {
    let layout = ctx.begin_vertex_layout(vertex_buffer, index_buffer)?;

    let mut occurrences: HashMap<&str, u32> = HashMap::new();
    for attribute in attributes {
        let count = occurrences.entry(attribute.name.as_str()).or_insert(0);
        *count += 1;

        let input_name = if *count > 1 {
            format!("v{}{}", attribute.name, *count)
        } else {
            format!("v{}", attribute.name)
        };

        let Some(location) = ctx.attribute_location(program, &input_name) else {
            continue;
        };

        ctx.bind_attribute(
            location,
            attribute.format.pointer(),
            stride as i32,
            attribute.offset as i32,
        );
    }

    ctx.end_vertex_layout();
    Ok(layout)
}
