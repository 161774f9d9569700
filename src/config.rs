// src/config.rs

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::io;
use crate::model::{lattice, Beam, BeamSource, CellType, Sample, Screen, ScreenShape};
use crate::physics::{ScanOptions, TomoParams};

/// Structured simulation configuration. Every engine constructor
/// parameter appears here; `validate` checks ranges and cross-field
/// rules once, at the boundary, before anything touches the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sample: SampleConfig,
    pub beam: BeamConfig,
    pub screen: ScreenConfig,
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Path to a coordinate file (.xyz or .pdb).
    pub sample_file: String,
    /// Apply the experimental crystal interference kernel.
    #[serde(default)]
    pub crystal: bool,
    pub cell_type: CellType,
    /// 9 components (Full) or 6 lattice parameters (Reduced).
    pub cell_vec: Vec<f64>,
    #[serde(default = "default_supercell")]
    pub supercell: [u32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamConfig {
    pub source: BeamSource,
    /// X-ray wavelength in Angstroms (used when source = xray).
    pub wavelength: f64,
    /// Electron energy in eV (used when source = electron).
    #[serde(default)]
    pub energy: f64,
    pub vector: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub pixels: usize,
    pub shape: ScreenShape,
    /// Physical edge length / height in cm.
    pub dimensions: f64,
    pub max_2_theta: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub run_tomo: bool,
    pub rotation_axis: [f64; 3],
    pub angle_step: i64,
    pub max_angle: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Beamstop angular coverage in degrees two-theta.
    pub backstop_coverage: f64,
    pub output_file: String,
    /// Empty string skips the spectrum export.
    #[serde(default)]
    pub spectra_file: String,
}

fn default_supercell() -> [u32; 3] {
    [1, 1, 1]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample: SampleConfig {
                sample_file: "sample.xyz".to_string(),
                crystal: false,
                cell_type: CellType::Full,
                cell_vec: vec![20.0, 0.0, 0.0, 0.0, 20.0, 0.0, 0.0, 0.0, 20.0],
                supercell: default_supercell(),
            },
            beam: BeamConfig {
                source: BeamSource::Xray,
                wavelength: 1.5406, // Cu K-alpha
                energy: 0.0,
                vector: [1.0, 0.0, 0.0],
            },
            screen: ScreenConfig {
                pixels: 120,
                shape: ScreenShape::Flat,
                dimensions: 5.0,
                max_2_theta: 80.0,
            },
            simulation: SimulationConfig {
                run_tomo: false,
                rotation_axis: [0.0, 0.0, 1.0],
                angle_step: 10,
                max_angle: 180,
            },
            output: OutputConfig {
                backstop_coverage: 2.0,
                output_file: "intensities.mrc".to_string(),
                spectra_file: String::new(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader)
            .map_err(|e| SimError::Parse(format!("bad config file: {e}")))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SimError::Parse(format!("cannot serialise config: {e}")))?;
        Ok(())
    }

    /// Range and cross-field checks. The core relies on these having
    /// been run once before construction.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sample;
        if s.sample_file.is_empty() {
            return Err(SimError::Precondition("sample_file must be set".into()));
        }
        let lower = s.sample_file.to_lowercase();
        if !(lower.ends_with(".xyz") || lower.ends_with(".pdb")) {
            return Err(SimError::Precondition(format!(
                "unsupported sample file '{}'",
                s.sample_file
            )));
        }
        let expected = match s.cell_type {
            CellType::Full => 9,
            CellType::Reduced => 6,
        };
        if s.cell_vec.len() != expected {
            return Err(SimError::Precondition(format!(
                "cell_vec needs {expected} values for {:?} cells, got {}",
                s.cell_type,
                s.cell_vec.len()
            )));
        }
        if s.supercell.iter().any(|&n| n == 0) {
            return Err(SimError::Precondition("supercell factors must be >= 1".into()));
        }

        match self.beam.source {
            BeamSource::Xray if self.beam.wavelength <= 0.0 => {
                return Err(SimError::Precondition(format!(
                    "wavelength must be > 0, got {}",
                    self.beam.wavelength
                )));
            }
            BeamSource::Electron if self.beam.energy <= 0.0 => {
                return Err(SimError::Precondition(format!(
                    "electron energy must be > 0, got {}",
                    self.beam.energy
                )));
            }
            _ => {}
        }
        if Vector3::from(self.beam.vector).norm() == 0.0 {
            return Err(SimError::Precondition("beam vector must be non-zero".into()));
        }

        if self.screen.pixels == 0 {
            return Err(SimError::Precondition("screen pixels must be > 0".into()));
        }
        if self.screen.dimensions <= 0.0 {
            return Err(SimError::Precondition("screen dimensions must be > 0".into()));
        }
        if self.screen.max_2_theta <= 0.0 {
            return Err(SimError::Precondition("max_2_theta must be > 0".into()));
        }

        if self.simulation.run_tomo {
            if Vector3::from(self.simulation.rotation_axis).norm() == 0.0 {
                return Err(SimError::Precondition("rotation axis must be non-zero".into()));
            }
            if self.simulation.angle_step <= 0 {
                return Err(SimError::Precondition(format!(
                    "angle_step must be > 0, got {}",
                    self.simulation.angle_step
                )));
            }
            if self.simulation.max_angle < self.simulation.angle_step
                || self.simulation.max_angle % self.simulation.angle_step != 0
            {
                return Err(SimError::Precondition(format!(
                    "max_angle {} must be a positive multiple of angle_step {}",
                    self.simulation.max_angle, self.simulation.angle_step
                )));
            }
        }

        if self.output.backstop_coverage <= 0.0 {
            return Err(SimError::Precondition("backstop_coverage must be > 0".into()));
        }
        if self.output.output_file.is_empty() {
            return Err(SimError::Precondition("output_file must be set".into()));
        }

        Ok(())
    }

    pub fn build_beam(&self) -> Result<Beam> {
        let direction = Vector3::from(self.beam.vector);
        match self.beam.source {
            BeamSource::Xray => Beam::xray(self.beam.wavelength, direction),
            BeamSource::Electron => Beam::electron(self.beam.energy, direction),
        }
    }

    pub fn build_screen(&self) -> Result<Screen> {
        Screen::new(
            self.screen.pixels,
            self.screen.dimensions,
            self.screen.shape,
            self.screen.max_2_theta,
            Vector3::from(self.beam.vector),
        )
    }

    pub fn load_sample(&self) -> Result<Sample> {
        let coords = io::load_coords(Path::new(&self.sample.sample_file))?;
        let cell = lattice::build_cell(self.sample.cell_type, &self.sample.cell_vec)?;
        Sample::from_coords(&coords, cell, self.sample.supercell)
    }

    pub fn scan_options(&self) -> ScanOptions {
        let tomography = self.simulation.run_tomo.then(|| TomoParams {
            rotation_axis: Vector3::from(self.simulation.rotation_axis),
            angle_step: self.simulation.angle_step,
            max_angle: self.simulation.max_angle,
        });
        ScanOptions {
            tomography,
            backstop_coverage: self.output.backstop_coverage,
            crystal_interference: self.sample.crystal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn config_roundtrips_through_json() {
        let path = std::env::temp_dir().join(format!(
            "diffsim-config-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let config = Config::default();
        config.save(&path).unwrap();
        let back = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(back.screen.pixels, config.screen.pixels);
        assert_eq!(back.beam.vector, config.beam.vector);
        assert_eq!(back.sample.cell_vec, config.sample.cell_vec);
    }

    #[test]
    fn enums_serialize_lowercase() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"cell_type\":\"full\""));
        assert!(json.contains("\"shape\":\"flat\""));
        assert!(json.contains("\"source\":\"xray\""));
    }

    #[test]
    fn cross_field_rules() {
        let mut config = Config::default();
        config.simulation.run_tomo = true;
        config.simulation.angle_step = 40;
        config.simulation.max_angle = 90;
        assert!(matches!(
            config.validate(),
            Err(SimError::Precondition(_))
        ));

        config.simulation.angle_step = 30;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_ranges_rejected() {
        let mut config = Config::default();
        config.beam.wavelength = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.screen.max_2_theta = -5.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.sample.cell_vec.truncate(6);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.output.backstop_coverage = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn electron_beam_needs_energy() {
        let mut config = Config::default();
        config.beam.source = BeamSource::Electron;
        assert!(config.validate().is_err());

        config.beam.energy = 2.0e5;
        assert!(config.validate().is_ok());
    }
}
