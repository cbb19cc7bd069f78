//! Scene source boundary
//!
//! The asset layer hands over a loosely-structured property tree
//! (`serde_json::Value`) plus the raw vertex/index buffer blocks. Everything
//! here parses that tree into strongly-typed, ordered data, failing fast on
//! anything malformed; nothing downstream touches the tree again.
//!
//! Sequences arrive either as JSON arrays or as objects keyed "0", "1", ...
//! For keyed objects a missing sequential key is a fatal format error.

use glam::Vec3;
use serde_json::Value;

use crate::backend::PrimitiveTopology;
use crate::backend::VertexAttribute;
use crate::error::FormatError;

const KEY_SCENE_OBJECTS: &str = "m_sceneObjects";
const KEY_DRAW_CALLS: &str = "m_drawCalls";
const KEY_PRIMITIVE_TYPE: &str = "m_nPrimitiveType";
const KEY_MATERIAL: &str = "m_material";
const KEY_BASE_VERTEX: &str = "m_nBaseVertex";
const KEY_VERTEX_COUNT: &str = "m_nVertexCount";
const KEY_START_INDEX: &str = "m_nStartIndex";
const KEY_INDEX_COUNT: &str = "m_nIndexCount";
const KEY_INDEX_BUFFER: &str = "m_indexBuffer";
const KEY_VERTEX_BUFFERS: &str = "m_vertexBuffers";
const KEY_BUFFER_HANDLE: &str = "m_hBuffer";
const KEY_BIND_OFFSET: &str = "m_nBindOffsetBytes";
const KEY_TINT_COLOR: &str = "m_vTintColor";
const KEY_MIN_BOUNDS: &str = "m_vMinBounds";
const KEY_MAX_BOUNDS: &str = "m_vMaxBounds";

const PRIMITIVE_TRIANGLES: &str = "RENDER_PRIM_TRIANGLES";

/// One raw vertex buffer block with its attribute descriptors.
#[derive(Debug, Clone)]
pub struct VertexBufferSource {
    pub data: Vec<u8>,
    pub element_count: u32,
    /// Bytes per vertex.
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

/// One raw index buffer block.
#[derive(Debug, Clone)]
pub struct IndexBufferSource {
    pub data: Vec<u8>,
    pub element_count: u32,
    /// Bytes per index element; only 2 and 4 are renderable.
    pub element_size: u32,
}

/// The transient scene description for one mesh, read once at load.
#[derive(Debug, Clone)]
pub struct MeshSource {
    /// Hierarchical property tree holding the scene-object list.
    pub scene: Value,
    pub vertex_buffers: Vec<VertexBufferSource>,
    pub index_buffers: Vec<IndexBufferSource>,
}

/// Reference to a buffer by upload-array index plus byte bind offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRef {
    pub index: usize,
    pub offset: u32,
}

/// A fully extracted draw-call entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCallSource {
    pub topology: PrimitiveTopology,
    pub material: String,
    pub vertex_buffer: BufferRef,
    pub index_buffer: BufferRef,
    pub base_vertex: u32,
    pub vertex_count: u32,
    /// Start index in element units; converted to bytes at build time.
    pub start_index: u32,
    pub index_count: i32,
    pub tint: Option<Vec3>,
}

/// Resolve a value that must be an ordered sequence.
pub(crate) fn sequence<'a>(
    value: &'a Value,
    context: &'static str,
) -> Result<Vec<&'a Value>, FormatError> {
    match value {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => {
            let mut items = Vec::with_capacity(map.len());
            for index in 0..map.len() {
                let item = map
                    .get(&index.to_string())
                    .ok_or(FormatError::NonContiguousSequence { context, index })?;
                items.push(item);
            }
            Ok(items)
        }
        _ => Err(FormatError::NotASequence(context)),
    }
}

fn field<'a>(
    value: &'a Value,
    context: &'static str,
    field: &'static str,
) -> Result<&'a Value, FormatError> {
    value
        .get(field)
        .ok_or(FormatError::MissingField { context, field })
}

fn u32_field(value: &Value, context: &'static str, name: &'static str) -> Result<u32, FormatError> {
    field(value, context, name)?
        .as_u64()
        .map(|v| v as u32)
        .ok_or(FormatError::InvalidField {
            context,
            field: name,
        })
}

fn i32_field(value: &Value, context: &'static str, name: &'static str) -> Result<i32, FormatError> {
    field(value, context, name)?
        .as_i64()
        .map(|v| v as i32)
        .ok_or(FormatError::InvalidField {
            context,
            field: name,
        })
}

fn str_field<'a>(
    value: &'a Value,
    context: &'static str,
    name: &'static str,
) -> Result<&'a str, FormatError> {
    field(value, context, name)?
        .as_str()
        .ok_or(FormatError::InvalidField {
            context,
            field: name,
        })
}

/// Parse a three-component vector given as a sequence of numbers.
pub(crate) fn parse_vec3(value: &Value, context: &'static str) -> Result<Vec3, FormatError> {
    let items = sequence(value, context)?;
    if items.len() < 3 {
        return Err(FormatError::NotASequence(context));
    }
    let mut out = [0.0f32; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or(FormatError::InvalidField {
            context,
            field: "component",
        })? as f32;
    }
    Ok(Vec3::from_array(out))
}

/// The ordered scene-object list of a mesh's property tree.
pub(crate) fn scene_objects(scene: &Value) -> Result<Vec<&Value>, FormatError> {
    sequence(
        field(scene, "scene", KEY_SCENE_OBJECTS)?,
        KEY_SCENE_OBJECTS,
    )
}

/// The ordered draw-call list of one scene object.
pub(crate) fn draw_call_entries(scene_object: &Value) -> Result<Vec<&Value>, FormatError> {
    sequence(
        field(scene_object, "scene object", KEY_DRAW_CALLS)?,
        KEY_DRAW_CALLS,
    )
}

fn parse_buffer_ref(value: &Value, context: &'static str) -> Result<BufferRef, FormatError> {
    Ok(BufferRef {
        index: u32_field(value, context, KEY_BUFFER_HANDLE)? as usize,
        offset: u32_field(value, context, KEY_BIND_OFFSET)?,
    })
}

/// Extract one draw-call entry.
pub(crate) fn parse_draw_call(entry: &Value) -> Result<DrawCallSource, FormatError> {
    const CONTEXT: &str = "draw call";

    let primitive = str_field(entry, CONTEXT, KEY_PRIMITIVE_TYPE)?;
    let topology = match primitive {
        PRIMITIVE_TRIANGLES => PrimitiveTopology::TriangleList,
        other => return Err(FormatError::UnsupportedPrimitiveType(other.to_string())),
    };

    let material = str_field(entry, CONTEXT, KEY_MATERIAL)?.to_string();

    let index_buffer = parse_buffer_ref(field(entry, CONTEXT, KEY_INDEX_BUFFER)?, "index buffer")?;

    // The format allows several vertex streams per draw call; only the
    // first is bound.
    let vertex_buffers = sequence(field(entry, CONTEXT, KEY_VERTEX_BUFFERS)?, KEY_VERTEX_BUFFERS)?;
    let first = vertex_buffers.first().ok_or(FormatError::MissingField {
        context: CONTEXT,
        field: KEY_VERTEX_BUFFERS,
    })?;
    let vertex_buffer = parse_buffer_ref(first, "vertex buffer")?;

    let tint = match entry.get(KEY_TINT_COLOR) {
        Some(value) => Some(parse_vec3(value, KEY_TINT_COLOR)?),
        None => None,
    };

    Ok(DrawCallSource {
        topology,
        material,
        vertex_buffer,
        index_buffer,
        base_vertex: u32_field(entry, CONTEXT, KEY_BASE_VERTEX)?,
        vertex_count: u32_field(entry, CONTEXT, KEY_VERTEX_COUNT)?,
        start_index: u32_field(entry, CONTEXT, KEY_START_INDEX)?,
        index_count: i32_field(entry, CONTEXT, KEY_INDEX_COUNT)?,
        tint,
    })
}

/// Min/max bound vectors of one scene object.
pub(crate) fn object_bounds(scene_object: &Value) -> Result<(Vec3, Vec3), FormatError> {
    let min = parse_vec3(
        field(scene_object, "scene object", KEY_MIN_BOUNDS)?,
        KEY_MIN_BOUNDS,
    )?;
    let max = parse_vec3(
        field(scene_object, "scene object", KEY_MAX_BOUNDS)?,
        KEY_MAX_BOUNDS,
    )?;
    Ok((min, max))
}
