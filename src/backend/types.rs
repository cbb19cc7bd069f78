//! Common types shared between backends

use crate::error::FormatError;

/// Handle to a GPU buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a GPU vertex layout object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayoutHandle(pub(crate) u64);

/// Handle to a GPU texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) u64);

/// Handle to a uniform location within a program.
///
/// Obtained from [`GpuContext::uniform_location`](super::GpuContext::uniform_location);
/// an absent uniform yields `None` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u64);

/// What a buffer is bound as at upload and draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Primitive topology
///
/// The asset format declares a topology tag per draw call; only triangle
/// lists are supported, anything else is rejected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// Index element width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl IndexFormat {
    /// Map an index buffer's element size in bytes to its format.
    pub fn from_element_size(size: u32) -> Result<Self, FormatError> {
        match size {
            2 => Ok(IndexFormat::Uint16),
            4 => Ok(IndexFormat::Uint32),
            other => Err(FormatError::UnsupportedIndexSize(other)),
        }
    }

    /// Element size in bytes.
    pub fn size(&self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// Scalar component type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Float32,
    Float16,
    Uint8,
    Uint16,
    Uint32,
    Int16,
}

/// How an attribute slot is bound: as a (possibly normalized) float pointer
/// or as an integer pointer that bypasses float conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributePointer {
    Float {
        components: i32,
        scalar: ScalarType,
        normalized: bool,
    },
    Integer {
        components: i32,
        scalar: ScalarType,
    },
}

/// Vertex attribute format
///
/// The fixed set of formats the asset format can declare. Tags outside this
/// set are a fatal format error at parse time, so the binding table below
/// is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexAttributeFormat {
    Float32x3,
    Unorm8x4,
    Float32x2,
    Float16x2,
    Float32x4,
    Uint8x4,
    Sint16x2,
    Sint16x4,
    Unorm16x2,
}

impl VertexAttributeFormat {
    /// Parse an asset-format tag string.
    pub fn from_tag(tag: &str) -> Result<Self, FormatError> {
        match tag {
            "R32G32B32_FLOAT" => Ok(Self::Float32x3),
            "R8G8B8A8_UNORM" => Ok(Self::Unorm8x4),
            "R32G32_FLOAT" => Ok(Self::Float32x2),
            "R16G16_FLOAT" => Ok(Self::Float16x2),
            "R32G32B32A32_FLOAT" => Ok(Self::Float32x4),
            "R8G8B8A8_UINT" => Ok(Self::Uint8x4),
            "R16G16_SINT" => Ok(Self::Sint16x2),
            "R16G16B16A16_SINT" => Ok(Self::Sint16x4),
            "R16G16_UNORM" => Ok(Self::Unorm16x2),
            other => Err(FormatError::UnknownAttributeFormat(other.to_string())),
        }
    }

    /// How this format is bound to an attribute slot.
    pub fn pointer(&self) -> AttributePointer {
        match self {
            Self::Float32x3 => AttributePointer::Float {
                components: 3,
                scalar: ScalarType::Float32,
                normalized: false,
            },
            Self::Unorm8x4 => AttributePointer::Float {
                components: 4,
                scalar: ScalarType::Uint8,
                normalized: false,
            },
            Self::Float32x2 => AttributePointer::Float {
                components: 2,
                scalar: ScalarType::Float32,
                normalized: false,
            },
            Self::Float16x2 => AttributePointer::Float {
                components: 2,
                scalar: ScalarType::Float16,
                normalized: false,
            },
            Self::Float32x4 => AttributePointer::Float {
                components: 4,
                scalar: ScalarType::Float32,
                normalized: false,
            },
            Self::Uint8x4 => AttributePointer::Integer {
                components: 4,
                scalar: ScalarType::Uint32,
            },
            Self::Sint16x2 => AttributePointer::Integer {
                components: 2,
                scalar: ScalarType::Int16,
            },
            Self::Sint16x4 => AttributePointer::Integer {
                components: 4,
                scalar: ScalarType::Int16,
            },
            Self::Unorm16x2 => AttributePointer::Float {
                components: 2,
                scalar: ScalarType::Uint16,
                normalized: true,
            },
        }
    }
}

/// Vertex attribute descriptor as declared by the asset's vertex buffers.
#[derive(Debug, Clone)]
pub struct VertexAttribute {
    /// Semantic name ("POSITION", "TEXCOORD", ...).
    pub name: String,
    /// Component format.
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex stride.
    pub offset: u32,
}
