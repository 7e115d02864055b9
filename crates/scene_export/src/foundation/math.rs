//! Math types for scene transforms
//!
//! Thin aliases over nalgebra; the export path only ever deals in world
//! transforms and their flattened property form.

pub use nalgebra::{Matrix4, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type (world transforms)
pub type Mat4 = Matrix4<f32>;

/// Flatten a transform into the 16 row-major floats used by
/// `transformation` scene properties.
pub fn mat4_to_row_major(m: &Mat4) -> Vec<f32> {
    let mut out = Vec::with_capacity(16);
    for row in 0..4 {
        for col in 0..4 {
            out.push(m[(row, col)]);
        }
    }
    out
}
