// src/model/screen.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::utils::geometry;

/// Alignment rotations below this angle (radians) are skipped; the
/// cross-product axis is degenerate near zero.
const ALIGN_EPS: f64 = 1.0e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenShape {
    Flat,
    Cylindrical,
}

/// Virtual detector: a resolution x resolution grid of unit scattering
/// directions with their two-theta angles against the beam.
///
/// The grid is built around the +x axis and rotated once, at
/// construction, onto the supplied beam axis. Physical size comes in
/// as cm and is held in Angstroms (x 1e8) so screen geometry and
/// wavelength share length units.
#[derive(Debug, Clone)]
pub struct Screen {
    resolution: usize,
    size: f64,
    shape: ScreenShape,
    max_two_theta: f64,
    directions: Vec<Vector3<f64>>,
    two_theta: Vec<f64>,
}

impl Screen {
    pub fn new(
        resolution: usize,
        size_cm: f64,
        shape: ScreenShape,
        max_two_theta: f64,
        beam_axis: Vector3<f64>,
    ) -> Result<Self> {
        if resolution == 0 {
            return Err(SimError::Domain("screen resolution must be positive".into()));
        }
        if size_cm <= 0.0 {
            return Err(SimError::Domain(format!(
                "screen size must be positive, got {size_cm}"
            )));
        }
        if max_two_theta <= 0.0 {
            return Err(SimError::Domain(format!(
                "max two-theta must be positive, got {max_two_theta}"
            )));
        }
        let axis_norm = beam_axis.norm();
        if axis_norm == 0.0 {
            return Err(SimError::Domain("beam axis has zero length".into()));
        }

        let size = size_cm * 1.0e8;
        let mut screen = Self {
            resolution,
            size,
            shape,
            max_two_theta,
            directions: Vec::new(),
            two_theta: Vec::new(),
        };
        screen.directions = screen.build_grid();
        screen.align_to(beam_axis / axis_norm)?;
        screen.recompute_two_theta(beam_axis / axis_norm);
        Ok(screen)
    }

    /// Pixel grid for the nominal +x construction axis, one unit
    /// vector per pixel, row-major (i, j) -> i * resolution + j.
    fn build_grid(&self) -> Vec<Vector3<f64>> {
        let n = self.resolution;
        let d = self.size;
        let max_tt = self.max_two_theta.to_radians();
        let mut grid = Vec::with_capacity(n * n);

        match self.shape {
            ScreenShape::Flat => {
                let dist = 0.5 * d / (0.5 * max_tt).tan();
                let step = d / n as f64;
                let min = -0.5 * d;
                for i in 0..n {
                    for j in 0..n {
                        let pixel =
                            Vector3::new(dist, min + i as f64 * step, min + j as f64 * step);
                        grid.push(pixel.normalize());
                    }
                }
            }
            ScreenShape::Cylindrical => {
                // Arc length d at radius r spans d / r radians.
                let dist = d / max_tt;
                let az_min = -0.5 * max_tt;
                let az_step = max_tt / n as f64;
                let z_min = -0.5 * d;
                let z_step = d / n as f64;
                for i in 0..n {
                    let azimuth = az_min + i as f64 * az_step;
                    for j in 0..n {
                        let pixel = Vector3::new(
                            dist * azimuth.cos(),
                            dist * azimuth.sin(),
                            z_min + j as f64 * z_step,
                        );
                        grid.push(pixel.normalize());
                    }
                }
            }
        }
        grid
    }

    /// Rotates the grid from the +x construction axis onto the beam
    /// axis, about their common normal. Skipped for near-parallel axes
    /// where the rotation axis degenerates.
    fn align_to(&mut self, beam_axis: Vector3<f64>) -> Result<()> {
        let default_axis = Vector3::new(1.0, 0.0, 0.0);
        let angle = geometry::angle_between(default_axis, beam_axis);
        if angle.abs() < ALIGN_EPS {
            return Ok(());
        }
        let rot_axis = default_axis.cross(&beam_axis);
        for dir in &mut self.directions {
            *dir = geometry::rotate(*dir, rot_axis, angle.to_degrees())?;
        }
        Ok(())
    }

    /// Rebuilds the two-theta grid from the direction grid:
    /// 2 * acos(direction . beam). Must be re-run if the beam
    /// direction ever changes.
    pub fn recompute_two_theta(&mut self, beam_direction: Vector3<f64>) {
        self.two_theta = self
            .directions
            .iter()
            .map(|dir| 2.0 * dir.dot(&beam_direction).clamp(-1.0, 1.0).acos().to_degrees())
            .collect();
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn shape(&self) -> ScreenShape {
        self.shape
    }

    pub fn max_two_theta(&self) -> f64 {
        self.max_two_theta
    }

    pub fn directions(&self) -> &[Vector3<f64>] {
        &self.directions
    }

    pub fn two_theta(&self) -> &[f64] {
        &self.two_theta
    }

    pub fn direction(&self, i: usize, j: usize) -> Vector3<f64> {
        self.directions[i * self.resolution + j]
    }

    pub fn two_theta_at(&self, i: usize, j: usize) -> f64 {
        self.two_theta[i * self.resolution + j]
    }
}
