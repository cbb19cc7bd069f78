//! Backend abstraction layer
//!
//! Provides the [`GpuContext`] trait plus the OpenGL and dummy
//! implementations. A context is the arena that owns all GPU handles;
//! dropping it invalidates every handle it issued.

pub mod dummy;
pub mod error;
pub mod glow_backend;
pub mod layout;
pub mod traits;
pub mod types;

pub use error::*;
pub use glow_backend::GlowContext;
pub use layout::build_vertex_layout;
pub use traits::*;
pub use types::*;
