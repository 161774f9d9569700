// src/physics/simulation.rs

use std::f64::consts::PI;

use nalgebra::Vector3;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::model::{Beam, Sample, Screen};

/// Tomographic scan parameters: the sample turns about `rotation_axis`
/// by `angle_step` degrees between images, up to `max_angle` inclusive.
#[derive(Debug, Clone, Copy)]
pub struct TomoParams {
    pub rotation_axis: Vector3<f64>,
    pub angle_step: i64,
    pub max_angle: i64,
}

/// Engine options beyond the three borrowed collaborators.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub tomography: Option<TomoParams>,
    /// Angular radius (degrees, two-theta) of the beamstop mask.
    pub backstop_coverage: f64,
    /// Multiply the structure factor by the periodic lattice
    /// interference kernel built from the supercell dimensions.
    /// Experimental; off by default.
    pub crystal_interference: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tomography: None,
            backstop_coverage: 1.0,
            crystal_interference: false,
        }
    }
}

/// Diffraction engine. Borrows the sample, screen and beam for its
/// whole lifetime and owns the intensity stack it fills.
///
/// Tomography rotates the sample in place between images; after
/// `full_scan` the sample is left in the orientation of the *last*
/// image. A second independent scan needs an externally reset sample.
pub struct Simulation<'a> {
    sample: &'a mut Sample,
    screen: &'a Screen,
    beam: &'a Beam,
    options: ScanOptions,
    image_count: usize,
    intensities: Vec<f64>,
}

impl<'a> Simulation<'a> {
    pub fn new(
        sample: &'a mut Sample,
        screen: &'a Screen,
        beam: &'a Beam,
        options: ScanOptions,
    ) -> Result<Self> {
        if options.backstop_coverage <= 0.0 {
            return Err(SimError::Precondition(format!(
                "backstop coverage must be positive, got {}",
                options.backstop_coverage
            )));
        }
        let image_count = match options.tomography {
            None => 1,
            Some(tomo) => {
                if tomo.angle_step <= 0 {
                    return Err(SimError::Precondition(format!(
                        "angle step must be positive, got {}",
                        tomo.angle_step
                    )));
                }
                if tomo.max_angle % tomo.angle_step != 0 {
                    return Err(SimError::Precondition(format!(
                        "angle step {} does not evenly divide max angle {}",
                        tomo.angle_step, tomo.max_angle
                    )));
                }
                (tomo.max_angle / tomo.angle_step) as usize + 1
            }
        };

        let npix = screen.resolution() * screen.resolution();
        Ok(Self {
            sample,
            screen,
            beam,
            options,
            image_count,
            intensities: vec![0.0; image_count * npix],
        })
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn resolution(&self) -> usize {
        self.screen.resolution()
    }

    /// Slice-major intensity stack, filled by `full_scan`.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn image(&self, index: usize) -> &[f64] {
        let npix = self.screen.resolution() * self.screen.resolution();
        &self.intensities[index * npix..(index + 1) * npix]
    }

    /// One image at the sample's current orientation:
    /// structure factor per pixel, beamstop mask, normalisation to the
    /// brightest pixel, squared magnitude.
    pub fn single_scan(&self) -> Result<Vec<f64>> {
        let wavelength = self.beam.wavelength();
        let beam_dir = self.beam.direction();
        let cell = *self.sample.cell();
        let atoms = self.sample.atoms();
        let supercell = self.sample.supercell();
        let interference = self.options.crystal_interference;

        let mut form_factors: Vec<Complex64> = self
            .screen
            .directions()
            .par_iter()
            .map(|dir| {
                let s = (dir - beam_dir) / wavelength;
                let s_sq = s.norm_squared();
                let hkl = cell * s;

                let mut f = Complex64::new(0.0, 0.0);
                for atom in atoms {
                    let gaussian = atom.charge * (-PI * PI * s_sq / atom.k_factor()).exp();
                    let phase = 2.0 * PI * hkl.dot(&atom.frac_position);
                    f += Complex64::from_polar(gaussian, phase);
                }
                if interference {
                    f *= lattice_interference(hkl, supercell);
                }
                f
            })
            .collect();

        // Beamstop: zero out everything inside the masked cone.
        for (f, &tt) in form_factors.iter_mut().zip(self.screen.two_theta()) {
            if tt < self.options.backstop_coverage {
                *f = Complex64::new(0.0, 0.0);
            }
        }

        let max_amp = form_factors
            .iter()
            .map(|f| f.norm())
            .fold(0.0_f64, f64::max);
        if max_amp == 0.0 {
            return Err(SimError::Numerical(
                "structure factor vanished at every pixel; cannot normalise".into(),
            ));
        }

        Ok(form_factors
            .iter()
            .map(|f| (f.norm() / max_amp).powi(2))
            .collect())
    }

    /// Runs the whole scan. Image 0 is taken at the current
    /// orientation; each subsequent image is taken after rotating the
    /// sample by one angle step. Post-condition: with tomography on,
    /// the borrowed sample stays in its final rotated orientation.
    pub fn full_scan(&mut self) -> Result<()> {
        let npix = self.screen.resolution() * self.screen.resolution();
        for index in 0..self.image_count {
            if index > 0 {
                // image_count > 1 implies tomography parameters exist
                let tomo = self.options.tomography.ok_or_else(|| {
                    SimError::Precondition("multiple images need tomography parameters".into())
                })?;
                self.sample
                    .rotate(tomo.rotation_axis, tomo.angle_step as f64)?;
            }
            let image = self.single_scan()?;
            self.intensities[index * npix..(index + 1) * npix].copy_from_slice(&image);
        }
        Ok(())
    }

    /// Radial spectrum: for every image, pixel intensities summed into
    /// `resolution / 2` equal two-theta bins over [0, max_two_theta].
    /// Pixels beyond max_two_theta are excluded. Row 0 of the result
    /// holds the lower bin edges; row 1 + i holds image i.
    pub fn spectrum(&self) -> Result<Spectrum> {
        let bins = self.screen.resolution() / 2;
        if bins == 0 {
            return Err(SimError::Precondition(
                "screen resolution too small to bin a spectrum".into(),
            ));
        }
        let max_tt = self.screen.max_two_theta();
        let bin_width = max_tt / bins as f64;

        let edges: Vec<f64> = (0..bins).map(|b| b as f64 * bin_width).collect();
        let mut rows = Vec::with_capacity(self.image_count);
        for index in 0..self.image_count {
            let mut row = vec![0.0; bins];
            for (&intensity, &tt) in self.image(index).iter().zip(self.screen.two_theta()) {
                if tt > max_tt {
                    continue;
                }
                let bin = ((tt / bin_width) as usize).min(bins - 1);
                row[bin] += intensity;
            }
            rows.push(row);
        }
        Ok(Spectrum { edges, rows })
    }
}

/// Radially binned intensities, one row per image.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub edges: Vec<f64>,
    pub rows: Vec<Vec<f64>>,
}

/// Periodic interference kernel of a finite lattice: the product over
/// the three cell axes of sin(N pi h) / sin(pi h), with the limit
/// value N at integral h.
fn lattice_interference(hkl: Vector3<f64>, supercell: [u32; 3]) -> f64 {
    let mut factor = 1.0;
    for (h, &n) in hkl.iter().zip(supercell.iter()) {
        let n = n as f64;
        let denom = (PI * h).sin();
        if denom.abs() < 1e-9 {
            factor *= n;
        } else {
            factor *= (n * PI * h).sin() / denom;
        }
    }
    factor
}
