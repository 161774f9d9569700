// src/model/sample.rs

use nalgebra::{Matrix3, Vector3};

use crate::error::{Result, SimError};
use crate::model::elements;
use crate::model::lattice;
use crate::utils::geometry;

/// A single scatterer.
///
/// `k_factor` is the Gaussian decay constant ln(2) / width^2 derived
/// from the FWHM-like `width`; it is recomputed whenever the width is
/// set and is always positive.
#[derive(Debug, Clone)]
pub struct Atom {
    pub element: String,
    pub charge: f64,
    width: f64,
    k_factor: f64,
    pub position: Vector3<f64>,
    pub frac_position: Vector3<f64>,
}

impl Atom {
    pub fn new(
        element: &str,
        charge: f64,
        width: f64,
        position: Vector3<f64>,
        frac_position: Vector3<f64>,
    ) -> Result<Self> {
        if width <= 0.0 {
            return Err(SimError::Domain(format!(
                "atom width must be positive, got {width}"
            )));
        }
        Ok(Self {
            element: element.to_string(),
            charge,
            width,
            k_factor: std::f64::consts::LN_2 / (width * width),
            position,
            frac_position,
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) -> Result<()> {
        if width <= 0.0 {
            return Err(SimError::Domain(format!(
                "atom width must be positive, got {width}"
            )));
        }
        self.width = width;
        self.k_factor = std::f64::consts::LN_2 / (width * width);
        Ok(())
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }
}

/// An atomistic sample: an ordered list of atoms plus the unit cell
/// they live in. Atom order is insertion order; it only matters for
/// reproducible summation.
#[derive(Debug, Clone)]
pub struct Sample {
    atoms: Vec<Atom>,
    cell: Matrix3<f64>,
    supercell: [u32; 3],
}

impl Sample {
    /// Builds a sample from parsed `(element, Cartesian position)`
    /// pairs and a unit cell:
    ///
    /// 1. shift positions so each coordinate's minimum sits at zero,
    /// 2. fractionalize against the cell and reject atoms at or past
    ///    the cell boundary (the cell must be enlarged),
    /// 3. look up each element's charge and width,
    /// 4. centre the finished sample on its centroid.
    pub fn from_coords(
        coords: &[(String, Vector3<f64>)],
        cell: Matrix3<f64>,
        supercell: [u32; 3],
    ) -> Result<Self> {
        if coords.is_empty() {
            return Err(SimError::Domain("sample contains no atoms".into()));
        }
        if cell.determinant().abs() < 1e-12 {
            return Err(SimError::Domain("unit cell matrix is singular".into()));
        }

        let mut min = coords[0].1;
        for (_, pos) in coords {
            min.x = min.x.min(pos.x);
            min.y = min.y.min(pos.y);
            min.z = min.z.min(pos.z);
        }

        let mut sample = Self {
            atoms: Vec::with_capacity(coords.len()),
            cell,
            supercell,
        };

        for (element, pos) in coords {
            let position = pos - min;
            let frac = lattice::fractionalize(&cell, position)?;
            if frac.iter().any(|&f| f >= 1.0) {
                return Err(SimError::Domain(format!(
                    "atom '{element}' falls outside the declared unit cell; enlarge the cell"
                )));
            }

            let (charge, width) = elements::scattering_params(element)
                .ok_or_else(|| SimError::Lookup(element.clone()))?;
            sample
                .atoms
                .push(Atom::new(element, charge, width, position, frac)?);
        }

        sample.centre();
        Ok(sample)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn cell(&self) -> &Matrix3<f64> {
        &self.cell
    }

    pub fn supercell(&self) -> [u32; 3] {
        self.supercell
    }

    /// Adds `shift` to every atom's Cartesian position.
    pub fn translate(&mut self, shift: Vector3<f64>) {
        for atom in &mut self.atoms {
            atom.position += shift;
        }
    }

    /// Translates the sample so its geometric centroid is the origin.
    pub fn centre(&mut self) {
        if self.atoms.is_empty() {
            return;
        }
        let mut centroid = Vector3::zeros();
        for atom in &self.atoms {
            centroid += atom.position;
        }
        centroid /= self.atoms.len() as f64;
        self.translate(-centroid);
    }

    /// Rigid rotation of the whole cell: every atom position and every
    /// cell vector turns about `axis` by `angle_deg`. Fractional
    /// coordinates are basis-relative and stay untouched.
    pub fn rotate(&mut self, axis: Vector3<f64>, angle_deg: f64) -> Result<()> {
        for row in 0..3 {
            let rotated = geometry::rotate(self.cell.row(row).transpose(), axis, angle_deg)?;
            self.cell.set_row(row, &rotated.transpose());
        }
        for atom in &mut self.atoms {
            atom.position = geometry::rotate(atom.position, axis, angle_deg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic_cell(a: f64) -> Matrix3<f64> {
        Matrix3::from_row_slice(&[a, 0.0, 0.0, 0.0, a, 0.0, 0.0, 0.0, a])
    }

    fn water_ish() -> Vec<(String, Vector3<f64>)> {
        vec![
            ("O".to_string(), Vector3::new(5.0, 5.0, 5.0)),
            ("H".to_string(), Vector3::new(5.76, 5.59, 5.0)),
            ("H".to_string(), Vector3::new(4.24, 5.59, 5.0)),
        ]
    }

    #[test]
    fn construction_centres_centroid() {
        let sample = Sample::from_coords(&water_ish(), cubic_cell(10.0), [1, 1, 1]).unwrap();

        let mut centroid = Vector3::zeros();
        for atom in sample.atoms() {
            centroid += atom.position;
        }
        centroid /= sample.atoms().len() as f64;
        assert!(centroid.norm() < 1e-12);
    }

    #[test]
    fn k_factor_tracks_width() {
        let mut atom = Atom::new("C", 6.0, 0.77, Vector3::zeros(), Vector3::zeros()).unwrap();
        assert!((atom.k_factor() - std::f64::consts::LN_2 / (0.77 * 0.77)).abs() < 1e-15);

        atom.set_width(1.1).unwrap();
        assert!((atom.k_factor() - std::f64::consts::LN_2 / (1.1 * 1.1)).abs() < 1e-15);
        assert!(atom.set_width(0.0).is_err());
    }

    #[test]
    fn atom_outside_cell_rejected() {
        // 12 A spread inside a 10 A cell.
        let coords = vec![
            ("H".to_string(), Vector3::new(0.0, 0.0, 0.0)),
            ("H".to_string(), Vector3::new(12.0, 0.0, 0.0)),
        ];
        let err = Sample::from_coords(&coords, cubic_cell(10.0), [1, 1, 1]);
        assert!(matches!(err, Err(SimError::Domain(_))));
    }

    #[test]
    fn unknown_element_rejected() {
        let coords = vec![("Qq".to_string(), Vector3::new(1.0, 1.0, 1.0))];
        let err = Sample::from_coords(&coords, cubic_cell(10.0), [1, 1, 1]);
        assert!(matches!(err, Err(SimError::Lookup(_))));
    }

    #[test]
    fn fractional_positions_stay_inside_cell() {
        let sample = Sample::from_coords(&water_ish(), cubic_cell(10.0), [1, 1, 1]).unwrap();
        for atom in sample.atoms() {
            for f in atom.frac_position.iter() {
                assert!(*f >= 0.0 && *f < 1.0);
            }
        }
    }

    #[test]
    fn rotation_turns_atoms_and_cell_but_not_fractions() {
        let mut sample = Sample::from_coords(&water_ish(), cubic_cell(10.0), [1, 1, 1]).unwrap();
        let frac_before: Vec<_> = sample.atoms().iter().map(|a| a.frac_position).collect();
        let pos_before: Vec<_> = sample.atoms().iter().map(|a| a.position).collect();

        sample.rotate(Vector3::new(0.0, 0.0, 1.0), 90.0).unwrap();

        // Cell row 0 (10,0,0) must now point along +y.
        let row0 = sample.cell().row(0).transpose();
        assert!((row0 - Vector3::new(0.0, 10.0, 0.0)).norm() < 1e-10);

        for (atom, (before, frac)) in sample
            .atoms()
            .iter()
            .zip(pos_before.iter().zip(frac_before.iter()))
        {
            let expect = Vector3::new(-before.y, before.x, before.z);
            assert!((atom.position - expect).norm() < 1e-10);
            assert!((atom.frac_position - frac).norm() < 1e-15);
        }
    }

    #[test]
    fn translate_then_centre_roundtrip() {
        let mut sample = Sample::from_coords(&water_ish(), cubic_cell(10.0), [1, 1, 1]).unwrap();
        sample.translate(Vector3::new(3.0, -2.0, 0.5));
        sample.centre();

        let mut centroid = Vector3::zeros();
        for atom in sample.atoms() {
            centroid += atom.position;
        }
        assert!(centroid.norm() < 1e-10);
    }
}
