//! Material and shader resolution
//!
//! Materials and shaders are produced by an external provider (compilation
//! and caching are its business); this module defines the data the renderer
//! consumes and the resolve contract.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec4;

use crate::backend::{BackendResult, ProgramHandle, TextureHandle};

/// Material int parameter enabling alpha testing.
pub const PARAM_ALPHA_TEST: &str = "F_ALPHA_TEST";
/// Material float parameter (and uniform) carrying the alpha-test reference.
pub const PARAM_ALPHA_TEST_REFERENCE: &str = "g_flAlphaTestReference";

/// A resolved material: textures and scalar/vector parameters keyed by the
/// names the shader declares.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub shader_name: String,
    /// Texture bindings in declaration order; the renderer assigns texture
    /// units sequentially from this list.
    pub textures: Vec<(String, TextureHandle)>,
    pub float_params: HashMap<String, f32>,
    pub vector_params: HashMap<String, Vec4>,
    pub int_params: HashMap<String, i32>,
}

impl Material {
    pub fn new(name: impl Into<String>, shader_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader_name: shader_name.into(),
            textures: Vec::new(),
            float_params: HashMap::new(),
            vector_params: HashMap::new(),
            int_params: HashMap::new(),
        }
    }

    /// The alpha-test reference to upload: 0 unless the material enables
    /// alpha testing and declares a reference value.
    pub fn alpha_test_reference(&self) -> f32 {
        if self.int_params.get(PARAM_ALPHA_TEST).copied() == Some(1) {
            self.float_params
                .get(PARAM_ALPHA_TEST_REFERENCE)
                .copied()
                .unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

/// A resolved shader: its name plus the linked program handle. Uniform
/// lookup goes through the GPU context and is soft-missing.
#[derive(Debug, Clone)]
pub struct Shader {
    pub name: String,
    pub program: ProgramHandle,
}

/// External material/shader provider.
///
/// The provider may cache; this trait only defines the call contract. A
/// failed resolve is fatal for the load.
pub trait MaterialResolver {
    fn resolve(
        &mut self,
        name: &str,
        max_anisotropy: i32,
    ) -> BackendResult<(Arc<Material>, Arc<Shader>)>;
}
