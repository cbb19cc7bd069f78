//! Per-frame rendering
//!
//! Walks every mesh object's draw calls in stored order and keeps the
//! previous shader program and material name across the whole frame, so
//! consecutive draw calls sharing state skip the re-upload. Malformed
//! geometry never reaches this code; it is rejected at build time.

use std::time::Duration;

use glam::Vec3;

use crate::backend::GpuContext;
use crate::resources::PARAM_ALPHA_TEST_REFERENCE;
use crate::scene::{Camera, DrawCall, MeshObject};

const UNIFORM_PROJECTION: &str = "projection";
const UNIFORM_MODELVIEW: &str = "modelview";
const UNIFORM_LIGHT_POSITION: &str = "vLightPosition";
const UNIFORM_EYE_POSITION: &str = "vEyePosition";
const UNIFORM_TRANSFORM: &str = "transform";
const UNIFORM_TINT_SCENE_OBJECT: &str = "m_vTintColorSceneObject";
const UNIFORM_TINT_DRAW_CALL: &str = "m_vTintColorDrawCall";

/// The light sweeps sideways from the camera: amplitude in world units and
/// the wall-clock divisor of the sine phase.
const LIGHT_SWEEP_DISTANCE: f32 = 200.0;
const LIGHT_SWEEP_TIME_SCALE_MS: f32 = 500.0;

/// Position of the animated light for this frame.
fn animated_light_position(camera: &Camera, elapsed: Duration) -> Vec3 {
    let phase = (elapsed.as_millis() as f32 / LIGHT_SWEEP_TIME_SCALE_MS).sin();
    camera.position + camera.left() * LIGHT_SWEEP_DISTANCE * phase
}

/// Upload a material's textures and parameters for the active shader.
///
/// Texture units are assigned sequentially over the material's texture list;
/// a texture whose sampler uniform the shader lacks still consumes its unit
/// but is not bound. Absent parameter uniforms are skipped.
fn bind_material<C: GpuContext>(ctx: &mut C, call: &DrawCall) {
    let program = call.shader.program;

    for (unit, (sampler, texture)) in call.material.textures.iter().enumerate() {
        let Some(location) = ctx.uniform_location(program, sampler) else {
            continue;
        };
        ctx.bind_texture(unit as u32, *texture);
        ctx.set_uniform_i32(location, unit as i32);
    }

    for (name, value) in &call.material.float_params {
        if let Some(location) = ctx.uniform_location(program, name) {
            ctx.set_uniform_f32(location, *value);
        }
    }

    for (name, value) in &call.material.vector_params {
        if let Some(location) = ctx.uniform_location(program, name) {
            ctx.set_uniform_vec4(location, *value);
        }
    }

    if let Some(location) = ctx.uniform_location(program, PARAM_ALPHA_TEST_REFERENCE) {
        ctx.set_uniform_f32(location, call.material.alpha_test_reference());
    }
}

/// Render one frame.
///
/// `elapsed` is wall-clock time since the renderer started; it only drives
/// the light animation.
pub fn render_frame<C: GpuContext>(
    ctx: &mut C,
    camera: &Camera,
    objects: &[MeshObject],
    elapsed: Duration,
) {
    ctx.clear();

    let light_position = animated_light_position(camera, elapsed);

    let mut prev_shader = None;
    let mut prev_material: Option<&str> = None;

    for object in objects {
        let mut object_changed = true;

        for call in object.draw_calls() {
            let program = call.shader.program;

            if prev_shader != Some(program) {
                object_changed = true;
                prev_shader = Some(program);

                ctx.use_program(program);

                if let Some(location) = ctx.uniform_location(program, UNIFORM_PROJECTION) {
                    ctx.set_uniform_mat4(location, &camera.projection_matrix());
                }
                if let Some(location) = ctx.uniform_location(program, UNIFORM_MODELVIEW) {
                    ctx.set_uniform_mat4(location, &camera.view_matrix());
                }
                if let Some(location) = ctx.uniform_location(program, UNIFORM_LIGHT_POSITION) {
                    ctx.set_uniform_vec3(location, light_position);
                }
                if let Some(location) = ctx.uniform_location(program, UNIFORM_EYE_POSITION) {
                    ctx.set_uniform_vec3(location, camera.position);
                }
            }

            // First draw call of this object, or the shader just changed:
            // the per-object uniforms must be (re)uploaded, and the material
            // cache is stale for the new program.
            if object_changed {
                object_changed = false;
                prev_material = None;

                if let Some(location) = ctx.uniform_location(program, UNIFORM_TRANSFORM) {
                    ctx.set_uniform_mat4(location, &object.transform);
                }
                if let Some(location) = ctx.uniform_location(program, UNIFORM_TINT_SCENE_OBJECT) {
                    ctx.set_uniform_vec4(location, object.tint_color);
                }
            }

            ctx.bind_vertex_layout(call.vertex_layout);

            if let Some(location) = ctx.uniform_location(program, UNIFORM_TINT_DRAW_CALL) {
                ctx.set_uniform_vec3(location, call.tint_color.unwrap_or(Vec3::ZERO));
            }

            if prev_material != Some(call.material.name.as_str()) {
                prev_material = Some(call.material.name.as_str());
                bind_material(ctx, call);
            }

            ctx.draw_indexed(
                call.primitive_type,
                call.index_count,
                call.index_format,
                call.start_index_bytes as i32,
            );
        }
    }
}
