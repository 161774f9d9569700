// src/model/beam.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Electron rest energy in eV, used for the relativistic-free
/// de Broglie wavelength of an electron beam.
const ELECTRON_REST_EV: f64 = 0.511e6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamSource {
    Xray,
    Electron,
}

/// Monochromatic beam: a wavelength in Angstroms and a unit
/// propagation direction. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Beam {
    wavelength: f64,
    direction: Vector3<f64>,
}

impl Beam {
    /// X-ray beam from a wavelength in Angstroms.
    pub fn xray(wavelength: f64, direction: Vector3<f64>) -> Result<Self> {
        if wavelength <= 0.0 {
            return Err(SimError::Domain(format!(
                "beam wavelength must be positive, got {wavelength}"
            )));
        }
        Ok(Self {
            wavelength,
            direction: unit_direction(direction)?,
        })
    }

    /// Electron beam from a kinetic energy in eV; the wavelength is
    /// 12398.4193 / sqrt(2 * E * m_e c^2).
    pub fn electron(energy_ev: f64, direction: Vector3<f64>) -> Result<Self> {
        if energy_ev <= 0.0 {
            return Err(SimError::Domain(format!(
                "electron energy must be positive, got {energy_ev}"
            )));
        }
        let wavelength = 12398.4193 / (2.0 * energy_ev * ELECTRON_REST_EV).sqrt();
        Ok(Self {
            wavelength,
            direction: unit_direction(direction)?,
        })
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.direction
    }
}

fn unit_direction(direction: Vector3<f64>) -> Result<Vector3<f64>> {
    let norm = direction.norm();
    if norm == 0.0 {
        return Err(SimError::Domain("beam direction has zero length".into()));
    }
    Ok(direction / norm)
}
