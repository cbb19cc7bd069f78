//! Integration tests for the load pipeline and the per-frame renderer.
//!
//! Everything runs against the dummy backend: programs declare their
//! attribute/uniform names up front and every context command lands in a
//! call log the assertions inspect.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::{Mat4, Vec3, Vec4};
use serde_json::json;

use meshview::backend::dummy::{DummyContext, GpuCall, UniformValue};
use meshview::backend::{BackendResult, IndexFormat, PrimitiveTopology, VertexAttribute, VertexAttributeFormat};
use meshview::scene::{IndexBufferSource, VertexBufferSource};
use meshview::{
    render_frame, Camera, Material, MaterialResolver, MeshObject, MeshSource, Shader, Viewer,
    ViewerConfig,
};

/// Uniforms every test shader declares.
const SHADER_UNIFORMS: &[&str] = &[
    "projection",
    "modelview",
    "vLightPosition",
    "vEyePosition",
    "transform",
    "m_vTintColorSceneObject",
    "m_vTintColorDrawCall",
    "g_flAlphaTestReference",
    "g_tColor",
    "g_flMetalness",
    "g_vColorTint",
];

struct TestResolver {
    entries: HashMap<String, (Arc<Material>, Arc<Shader>)>,
}

impl TestResolver {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn insert(&mut self, material: Material, shader: Shader) {
        self.entries.insert(
            material.name.clone(),
            (Arc::new(material), Arc::new(shader)),
        );
    }
}

impl MaterialResolver for TestResolver {
    fn resolve(
        &mut self,
        name: &str,
        _max_anisotropy: i32,
    ) -> BackendResult<(Arc<Material>, Arc<Shader>)> {
        Ok(self.entries.get(name).expect("unknown test material").clone())
    }
}

fn draw_call_json(material: &str, start_index: u32) -> serde_json::Value {
    json!({
        "m_nPrimitiveType": "RENDER_PRIM_TRIANGLES",
        "m_material": material,
        "m_nBaseVertex": 0,
        "m_nVertexCount": 8,
        "m_nStartIndex": start_index,
        "m_nIndexCount": 12,
        "m_indexBuffer": { "m_hBuffer": 0, "m_nBindOffsetBytes": 0 },
        "m_vertexBuffers": { "0": { "m_hBuffer": 0, "m_nBindOffsetBytes": 0 } },
    })
}

fn mesh_source(materials: &[&str]) -> MeshSource {
    let mut calls = serde_json::Map::new();
    for (i, material) in materials.iter().enumerate() {
        calls.insert(i.to_string(), draw_call_json(material, i as u32 * 100));
    }
    MeshSource {
        scene: json!({
            "m_sceneObjects": {
                "0": {
                    "m_drawCalls": calls,
                    "m_vMinBounds": { "0": -8.0, "1": -8.0, "2": 0.0 },
                    "m_vMaxBounds": { "0": 8.0, "1": 8.0, "2": 16.0 },
                }
            }
        }),
        vertex_buffers: vec![VertexBufferSource {
            data: vec![0; 256],
            element_count: 8,
            stride: 32,
            attributes: vec![
                VertexAttribute {
                    name: "POSITION".to_string(),
                    format: VertexAttributeFormat::Float32x3,
                    offset: 0,
                },
                VertexAttribute {
                    name: "TEXCOORD".to_string(),
                    format: VertexAttributeFormat::Float32x2,
                    offset: 12,
                },
            ],
        }],
        index_buffers: vec![IndexBufferSource {
            data: vec![0; 48],
            element_count: 24,
            element_size: 2,
        }],
    }
}

fn test_material(name: &str, ctx: &mut DummyContext) -> Material {
    let mut material = Material::new(name, "vr_simple");
    material
        .textures
        .push(("g_tColor".to_string(), ctx.create_texture()));
    material.float_params.insert("g_flMetalness".to_string(), 0.25);
    material
        .vector_params
        .insert("g_vColorTint".to_string(), Vec4::ONE);
    material
}

/// Build one mesh object whose draw calls use the given materials, all on
/// one shared program.
fn build_object(
    ctx: &mut DummyContext,
    resolver: &mut TestResolver,
    materials: &[&str],
) -> MeshObject {
    let program = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);
    for name in materials {
        resolver.insert(
            test_material(name, ctx),
            Shader {
                name: "vr_simple".to_string(),
                program,
            },
        );
    }
    let mut object = MeshObject::new(mesh_source(materials));
    object.build_draw_calls(ctx, resolver, 0).unwrap();
    object
}

fn uniform_uploads<'a>(calls: &'a [GpuCall], name: &str) -> Vec<&'a UniformValue> {
    calls
        .iter()
        .filter_map(|call| match call {
            GpuCall::SetUniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
        .collect()
}

fn count_texture_binds(calls: &[GpuCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, GpuCall::BindTexture { .. }))
        .count()
}

fn count_use_program(calls: &[GpuCall]) -> usize {
    calls
        .iter()
        .filter(|call| matches!(call, GpuCall::UseProgram(_)))
        .count()
}

#[test]
fn same_shader_same_material_binds_state_once() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let object = build_object(&mut ctx, &mut resolver, &["stone", "stone"]);
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    assert_eq!(count_use_program(&calls), 1);
    // One material upload for two draw calls.
    assert_eq!(count_texture_binds(&calls), 1);
    assert_eq!(uniform_uploads(&calls, "g_flMetalness").len(), 1);
    assert_eq!(uniform_uploads(&calls, "g_vColorTint").len(), 1);
    // But two draws and two layout binds.
    let draws: Vec<_> = calls
        .iter()
        .filter(|call| matches!(call, GpuCall::DrawIndexed { .. }))
        .collect();
    assert_eq!(draws.len(), 2);
}

#[test]
fn material_change_reissues_textures_and_parameters() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let object = build_object(&mut ctx, &mut resolver, &["marble", "stone"]);
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    // Same shader throughout, so a single program bind...
    assert_eq!(count_use_program(&calls), 1);
    // ...but both materials upload their state.
    assert_eq!(count_texture_binds(&calls), 2);
    assert_eq!(uniform_uploads(&calls, "g_flMetalness").len(), 2);
    assert_eq!(uniform_uploads(&calls, "g_flAlphaTestReference").len(), 2);
}

#[test]
fn shader_change_reuploads_camera_uniforms() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();

    // Two materials on two distinct programs.
    let program_a = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);
    let program_b = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);
    resolver.insert(
        test_material("alpha", &mut ctx),
        Shader {
            name: "vr_simple".to_string(),
            program: program_a,
        },
    );
    resolver.insert(
        test_material("beta", &mut ctx),
        Shader {
            name: "vr_complex".to_string(),
            program: program_b,
        },
    );

    let mut object = MeshObject::new(mesh_source(&["alpha", "beta"]));
    object.build_draw_calls(&mut ctx, &mut resolver, 0).unwrap();
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    assert_eq!(count_use_program(&calls), 2);
    assert_eq!(uniform_uploads(&calls, "projection").len(), 2);
    assert_eq!(uniform_uploads(&calls, "modelview").len(), 2);
    assert_eq!(uniform_uploads(&calls, "vLightPosition").len(), 2);
    assert_eq!(uniform_uploads(&calls, "vEyePosition").len(), 2);
    // The object transform is re-uploaded after each shader change.
    assert_eq!(uniform_uploads(&calls, "transform").len(), 2);
}

#[test]
fn object_boundary_reuploads_transform_and_material() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let first = build_object(&mut ctx, &mut resolver, &["stone"]);
    let mut second = MeshObject::new(mesh_source(&["stone"]))
        .with_transform(Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0)));
    second.build_draw_calls(&mut ctx, &mut resolver, 0).unwrap();
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, &[first, second], Duration::ZERO);
    let calls = ctx.take_calls();

    // One shader across both objects, but each object uploads its own
    // transform and the material cache resets at the object boundary.
    assert_eq!(count_use_program(&calls), 1);
    assert_eq!(uniform_uploads(&calls, "transform").len(), 2);
    assert_eq!(uniform_uploads(&calls, "m_vTintColorSceneObject").len(), 2);
    assert_eq!(count_texture_binds(&calls), 2);
}

#[test]
fn draw_call_tint_uploaded_unconditionally() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let object = build_object(&mut ctx, &mut resolver, &["stone", "stone"]);
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    // One upload per draw call, defaulting to zero when the entry has no
    // tint.
    let tints = uniform_uploads(&calls, "m_vTintColorDrawCall");
    assert_eq!(tints.len(), 2);
    assert!(tints
        .iter()
        .all(|value| **value == UniformValue::Vec3(Vec3::ZERO)));
}

#[test]
fn alpha_test_reference_follows_material_parameters() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let program = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);

    let mut cutout = test_material("cutout", &mut ctx);
    cutout.int_params.insert("F_ALPHA_TEST".to_string(), 1);
    cutout
        .float_params
        .insert("g_flAlphaTestReference".to_string(), 0.5);
    resolver.insert(
        cutout,
        Shader {
            name: "vr_simple".to_string(),
            program,
        },
    );
    resolver.insert(
        test_material("opaque", &mut ctx),
        Shader {
            name: "vr_simple".to_string(),
            program,
        },
    );

    let mut object = MeshObject::new(mesh_source(&["cutout", "opaque"]));
    object.build_draw_calls(&mut ctx, &mut resolver, 0).unwrap();
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    // Draw calls are material-sorted: "cutout" then "opaque".
    let references = uniform_uploads(&calls, "g_flAlphaTestReference");
    assert_eq!(
        references,
        vec![&UniformValue::F32(0.5), &UniformValue::F32(0.0)]
    );
}

#[test]
fn absent_sampler_still_consumes_its_texture_unit() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let program = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);

    let mut material = test_material("layered", &mut ctx);
    // Insert a texture whose sampler the shader does not declare ahead of
    // one it does.
    material.textures.insert(
        0,
        ("g_tNormal".to_string(), ctx.create_texture()),
    );
    resolver.insert(
        material,
        Shader {
            name: "vr_simple".to_string(),
            program,
        },
    );

    let mut object = MeshObject::new(mesh_source(&["layered"]));
    object.build_draw_calls(&mut ctx, &mut resolver, 0).unwrap();
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    // g_tNormal is skipped but holds unit 0; g_tColor lands on unit 1.
    let units: Vec<u32> = calls
        .iter()
        .filter_map(|call| match call {
            GpuCall::BindTexture { unit, .. } => Some(*unit),
            _ => None,
        })
        .collect();
    assert_eq!(units, vec![1]);
    assert_eq!(uniform_uploads(&calls, "g_tColor"), vec![&UniformValue::I32(1)]);
}

#[test]
fn draw_parameters_carry_byte_offsets() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let object = build_object(&mut ctx, &mut resolver, &["stone", "stone"]);
    ctx.take_calls();

    let camera = Camera::new(1280.0, 720.0);
    render_frame(&mut ctx, &camera, std::slice::from_ref(&object), Duration::ZERO);
    let calls = ctx.take_calls();

    // Start indices 0 and 100 over 2-byte elements.
    let draws: Vec<(i32, IndexFormat, i32)> = calls
        .iter()
        .filter_map(|call| match call {
            GpuCall::DrawIndexed {
                topology,
                index_count,
                format,
                byte_offset,
            } => {
                assert_eq!(*topology, PrimitiveTopology::TriangleList);
                Some((*index_count, *format, *byte_offset))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        draws,
        vec![(12, IndexFormat::Uint16, 0), (12, IndexFormat::Uint16, 200)]
    );
}

#[test]
fn viewer_load_then_paint_renders_frames() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let program = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);
    resolver.insert(
        test_material("stone", &mut ctx),
        Shader {
            name: "vr_simple".to_string(),
            program,
        },
    );

    let mut viewer = Viewer::new(ctx, resolver, ViewerConfig::default());
    viewer.add_mesh_object(MeshObject::new(mesh_source(&["stone", "stone"])));
    viewer.add_camera("spawn", Mat4::from_translation(Vec3::new(0.0, 0.0, 64.0)));

    viewer.load(1280, 720).unwrap();
    assert_eq!(
        viewer.bounds(),
        (Vec3::new(-8.0, -8.0, 0.0), Vec3::new(8.0, 8.0, 16.0))
    );
    // Default camera plus the registered one.
    assert!(viewer.camera().is_some());
    viewer.activate_camera(1);
    assert_eq!(viewer.camera().unwrap().name(), Some("spawn"));
    viewer.activate_camera(0);

    viewer.ctx_mut().take_calls();
    viewer.paint();
    let calls = viewer.ctx_mut().take_calls();
    assert!(calls.contains(&GpuCall::Clear));
    assert_eq!(
        calls
            .iter()
            .filter(|call| matches!(call, GpuCall::DrawIndexed { .. }))
            .count(),
        2
    );

    viewer.resize(640, 480);
    let calls = viewer.ctx_mut().take_calls();
    assert!(calls.contains(&GpuCall::SetViewport {
        width: 640,
        height: 480
    }));

    viewer.set_hover(true);
    assert!(viewer.camera().unwrap().mouse_over_surface);
    viewer.focus();
    assert!(viewer.ctx_mut().take_calls().contains(&GpuCall::Clear));
}

#[test]
fn paint_before_load_is_a_no_op() {
    let ctx = DummyContext::new();
    let resolver = TestResolver::new();
    let mut viewer = Viewer::new(ctx, resolver, ViewerConfig::default());
    viewer.paint();
    assert!(viewer.ctx_mut().take_calls().is_empty());
}

#[test]
fn run_loop_stops_on_signal() {
    let mut ctx = DummyContext::new();
    let mut resolver = TestResolver::new();
    let program = ctx.create_program(&["vPOSITION", "vTEXCOORD"], SHADER_UNIFORMS);
    resolver.insert(
        test_material("stone", &mut ctx),
        Shader {
            name: "vr_simple".to_string(),
            program,
        },
    );

    let mut viewer = Viewer::new(ctx, resolver, ViewerConfig::default());
    viewer.add_mesh_object(MeshObject::new(mesh_source(&["stone"])));
    viewer.load(1280, 720).unwrap();

    let stop = AtomicBool::new(false);
    let mut frames = 0u32;
    viewer.run_loop(
        || {
            frames += 1;
            if frames == 3 {
                stop.store(true, Ordering::Relaxed);
            }
        },
        |_camera| {},
        &stop,
    );
    assert_eq!(frames, 3);
}
