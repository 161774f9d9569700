// src/utils/geometry.rs

use nalgebra::Vector3;

use crate::error::{Result, SimError};

/// Rotates `vector` about `axis` by `angle_deg` degrees using Rodrigues'
/// rotation formula. The axis is normalised internally; a zero-length
/// axis is rejected since it defines no rotation.
pub fn rotate(vector: Vector3<f64>, axis: Vector3<f64>, angle_deg: f64) -> Result<Vector3<f64>> {
    let norm = axis.norm();
    if norm == 0.0 {
        return Err(SimError::Domain("rotation axis has zero length".into()));
    }
    let k = axis / norm;
    let angle = angle_deg.to_radians();

    let rotated = vector * angle.cos()
        + k.cross(&vector) * angle.sin()
        + k * k.dot(&vector) * (1.0 - angle.cos());

    Ok(rotated)
}

/// Angle between two vectors in radians, clamped against rounding
/// drift outside acos's domain.
pub fn angle_between(u: Vector3<f64>, v: Vector3<f64>) -> f64 {
    let denom = u.norm() * v.norm();
    if denom == 0.0 {
        return 0.0;
    }
    (u.dot(&v) / denom).clamp(-1.0, 1.0).acos()
}
