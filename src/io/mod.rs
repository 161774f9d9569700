// src/io/mod.rs
pub mod mrc;
pub mod pdb;
pub mod xyz;

use std::path::Path;

use nalgebra::Vector3;

use crate::error::{Result, SimError};

/// Loads atomic coordinates, dispatching on the file extension.
pub fn load_coords(path: &Path) -> Result<Vec<(String, Vector3<f64>)>> {
    let name = path.to_string_lossy().to_lowercase();

    if name.ends_with(".xyz") {
        xyz::parse(path)
    } else if name.ends_with(".pdb") {
        pdb::parse(path)
    } else {
        Err(SimError::Parse(format!(
            "unsupported coordinate format '{}'; expected .xyz or .pdb",
            path.display()
        )))
    }
}
