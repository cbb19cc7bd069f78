//! Resource management
//!
//! Materials, shaders and the GPU buffer upload path.

mod material;
mod upload;

pub use material::*;
pub use upload::*;
