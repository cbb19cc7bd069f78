//! Initial camera bounds
//!
//! The default camera is sized from the first scene object of the first
//! mesh object only; everything else is ignored. Runs before draw-call
//! construction, while the scene sources are still present.

use glam::Vec3;

use crate::error::FormatError;

use super::object::MeshObject;
use super::source::{object_bounds, scene_objects};

/// Estimate the min/max bounds used to place the default camera.
///
/// No mesh objects (or an already-consumed source) leaves the bounds at
/// zero.
pub fn estimate_bounds(objects: &[MeshObject]) -> Result<(Vec3, Vec3), FormatError> {
    let Some(first) = objects.first() else {
        return Ok((Vec3::ZERO, Vec3::ZERO));
    };
    let Some(source) = first.source() else {
        return Ok((Vec3::ZERO, Vec3::ZERO));
    };
    let scene_objects = scene_objects(&source.scene)?;
    let Some(scene_object) = scene_objects.first() else {
        return Ok((Vec3::ZERO, Vec3::ZERO));
    };
    object_bounds(scene_object)
}
