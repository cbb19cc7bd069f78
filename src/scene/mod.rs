//! Scene management
//!
//! The scene-source boundary, mesh objects with their GPU-ready draw calls,
//! camera state and the initial-bounds estimate.

mod bounds;
mod camera;
mod object;
mod source;

pub use bounds::estimate_bounds;
pub use camera::Camera;
pub use object::{DrawCall, MeshObject};
pub use source::{BufferRef, DrawCallSource, IndexBufferSource, MeshSource, VertexBufferSource};
