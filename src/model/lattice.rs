// src/model/lattice.rs

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// How the unit cell is specified in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Nine Cartesian components, row per lattice vector.
    Full,
    /// Six lattice parameters {a, b, c, alpha, beta, gamma}.
    Reduced,
}

/// Builds the 3x3 cell matrix (rows = lattice basis vectors) from the
/// flat value list a configuration supplies: 9 components for `Full`,
/// 6 parameters for `Reduced`. The matrix must be invertible.
pub fn build_cell(cell_type: CellType, values: &[f64]) -> Result<Matrix3<f64>> {
    let cell = match cell_type {
        CellType::Full => {
            if values.len() != 9 {
                return Err(SimError::Domain(format!(
                    "full cell needs 9 components, got {}",
                    values.len()
                )));
            }
            Matrix3::from_row_slice(values)
        }
        CellType::Reduced => {
            if values.len() != 6 {
                return Err(SimError::Domain(format!(
                    "reduced cell needs 6 parameters, got {}",
                    values.len()
                )));
            }
            reduced_to_cartesian(
                values[0], values[1], values[2], values[3], values[4], values[5],
            )?
        }
    };

    if cell.determinant().abs() < 1e-12 {
        return Err(SimError::Domain("unit cell matrix is singular".into()));
    }
    Ok(cell)
}

/// Standard triclinic-to-Cartesian conversion. Angles in degrees.
///
/// a1 = a, b = (b cos(g), b sin(g), 0),
/// c = (c cos(b), c (cos(a) - cos(b) cos(g)) / sin(g), sqrt(c^2 - c1^2 - c2^2))
pub fn reduced_to_cartesian(
    a: f64,
    b: f64,
    c: f64,
    alpha_deg: f64,
    beta_deg: f64,
    gamma_deg: f64,
) -> Result<Matrix3<f64>> {
    let alpha = alpha_deg.to_radians();
    let beta = beta_deg.to_radians();
    let gamma = gamma_deg.to_radians();

    if gamma.sin() == 0.0 {
        return Err(SimError::Domain("gamma angle produces a degenerate cell".into()));
    }

    let b1 = b * gamma.cos();
    let b2 = b * gamma.sin();
    let c1 = c * beta.cos();
    let c2 = c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
    let c3_sq = c * c - c1 * c1 - c2 * c2;
    if c3_sq <= 0.0 {
        return Err(SimError::Domain(
            "lattice parameters do not describe a valid cell".into(),
        ));
    }

    Ok(Matrix3::from_row_slice(&[
        a,
        0.0,
        0.0,
        b1,
        b2,
        0.0,
        c1,
        c2,
        c3_sq.sqrt(),
    ]))
}

/// Fractional coordinates of a Cartesian position: pos * inv(cell)^T
/// in row convention, which is inv(cell) * pos as a column vector.
pub fn fractionalize(cell: &Matrix3<f64>, position: Vector3<f64>) -> Result<Vector3<f64>> {
    let inv = cell
        .try_inverse()
        .ok_or_else(|| SimError::Domain("unit cell matrix is singular".into()))?;
    Ok(inv * position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_reduced_cell() {
        let cell = reduced_to_cartesian(5.0, 5.0, 5.0, 90.0, 90.0, 90.0).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 5.0 } else { 0.0 };
                assert!((cell[(i, j)] - expect).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn hexagonal_reduced_cell() {
        // gamma = 120 deg: b = (-b/2, b*sqrt(3)/2, 0)
        let cell = reduced_to_cartesian(3.0, 3.0, 5.0, 90.0, 90.0, 120.0).unwrap();
        assert!((cell[(1, 0)] + 1.5).abs() < 1e-10);
        assert!((cell[(1, 1)] - 3.0 * 0.75f64.sqrt()).abs() < 1e-10);
        assert!((cell[(2, 2)] - 5.0).abs() < 1e-10);
    }

    #[test]
    fn fractional_coordinates_cubic() {
        let cell = Matrix3::from_row_slice(&[4.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0, 4.0]);
        let frac = fractionalize(&cell, Vector3::new(2.0, 1.0, 3.0)).unwrap();
        assert!((frac - Vector3::new(0.5, 0.25, 0.75)).norm() < 1e-12);
    }

    #[test]
    fn singular_cell_rejected() {
        let flat = [1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert!(matches!(
            build_cell(CellType::Full, &flat),
            Err(SimError::Domain(_))
        ));
    }

    #[test]
    fn wrong_component_count_rejected() {
        assert!(build_cell(CellType::Full, &[1.0; 6]).is_err());
        assert!(build_cell(CellType::Reduced, &[1.0; 9]).is_err());
    }
}
